//! First-run detection
//!
//! The presence of the engine's system schema is the single branch point of
//! the bootstrap. Detection only looks; it never creates or touches the data
//! directory.

use std::fmt;
use std::path::Path;

/// Subdirectory holding the engine's system schema
pub const SYSTEM_SCHEMA_DIR: &str = "mysql";

/// Whether the data directory already holds a database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitDirectoryClassification {
    /// No system schema: provision from scratch
    Fresh,
    /// System schema present: never re-initialize
    PreExisting,
}

impl InitDirectoryClassification {
    /// Classify `data_dir`
    pub fn detect(data_dir: &Path) -> Self {
        if data_dir.join(SYSTEM_SCHEMA_DIR).is_dir() {
            Self::PreExisting
        } else {
            Self::Fresh
        }
    }

    /// Whether the fresh-init path applies
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

impl fmt::Display for InitDirectoryClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::PreExisting => write!(f, "pre-existing"),
        }
    }
}
