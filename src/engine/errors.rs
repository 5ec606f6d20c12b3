//! Engine interaction errors
//!
//! Every failed interaction with the engine or its client tools is FATAL.
//! Nothing here is retried.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use super::state::ServerRunState;

/// Result type for engine interactions
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine interaction errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("mysqld failed while attempting to check config\n\tcommand was: {command}\n\t{stderr}")]
    ConfigCheck { command: String, stderr: String },

    #[error("engine configuration has no value for '{0}'")]
    MissingSetting(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to initialize database files. ({status})")]
    Initialize { status: ExitStatus },

    #[error("Unable to start server. ({status})")]
    Startup { status: ExitStatus },

    #[error("Unable to shut down server. ({status})")]
    Shutdown { status: ExitStatus },

    #[error("SQL execution failed for {context} ({status})")]
    Sql { context: String, status: ExitStatus },

    #[error("{program} failed to decompress {path:?} ({status})")]
    Decompress {
        program: &'static str,
        path: PathBuf,
        status: ExitStatus,
    },

    #[error("timezone compiler failed ({status})")]
    Timezone { status: ExitStatus },

    #[error("forbidden server state transition: {from} -> {to}")]
    InvalidTransition {
        from: ServerRunState,
        to: ServerRunState,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// Wrap a spawn failure for `program`
    pub fn spawn(program: impl AsRef<std::ffi::OsStr>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.as_ref().to_string_lossy().into_owned(),
            source,
        }
    }
}
