//! Init script errors

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::engine::EngineError;

/// Result type for init script handling
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Init script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The init script directory cannot be listed
    #[error("cannot list init script directory {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run init script {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("init script {path:?} failed ({status})")]
    Failed { path: PathBuf, status: ExitStatus },

    #[error(transparent)]
    Sql(#[from] EngineError),
}

impl ScriptError {
    /// Whether this is the unreadable-directory guard
    pub fn is_permission_error(&self) -> bool {
        matches!(self, ScriptError::Unreadable { .. })
    }
}
