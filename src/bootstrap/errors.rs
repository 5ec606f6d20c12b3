//! Bootstrap error taxonomy
//!
//! Every error is FATAL: it is logged once with its code and the process
//! exits non-zero. There is no partial-success mode and no rollback.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::init_scripts::ScriptError;
use crate::provision::ProvisionError;

/// Result type for a bootstrap run
pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Bootstrap error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapErrorCode {
    /// Invalid environment
    ConfigError,
    /// Engine rejected its own configuration
    ConfigCheckFailed,
    /// Temporary server failed to start
    StartupFailed,
    /// Temporary server failed to stop
    ShutdownFailed,
    /// Init script directory unreadable
    PermissionDenied,
    /// Data directory initialization failed
    InitializeFailed,
    /// SQL batch failed
    SqlFailed,
    /// Init script failed
    ScriptFailed,
    /// Directory creation or ownership failed
    ProvisionFailed,
    /// Server lifecycle step out of order
    InvalidTransition,
    /// Process replacement failed
    HandoffFailed,
}

impl BootstrapErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ENTRYPOINT_CONFIG_ERROR",
            Self::ConfigCheckFailed => "ENTRYPOINT_CONFIG_CHECK_FAILED",
            Self::StartupFailed => "ENTRYPOINT_STARTUP_FAILED",
            Self::ShutdownFailed => "ENTRYPOINT_SHUTDOWN_FAILED",
            Self::PermissionDenied => "ENTRYPOINT_PERMISSION_DENIED",
            Self::InitializeFailed => "ENTRYPOINT_INITIALIZE_FAILED",
            Self::SqlFailed => "ENTRYPOINT_SQL_FAILED",
            Self::ScriptFailed => "ENTRYPOINT_SCRIPT_FAILED",
            Self::ProvisionFailed => "ENTRYPOINT_PROVISION_FAILED",
            Self::InvalidTransition => "ENTRYPOINT_INVALID_TRANSITION",
            Self::HandoffFailed => "ENTRYPOINT_HANDOFF_FAILED",
        }
    }
}

/// Bootstrap error
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("failed to execute {program}: {source}")]
    Handoff {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl BootstrapError {
    /// Get the error code
    pub fn code(&self) -> BootstrapErrorCode {
        match self {
            Self::Config(_) => BootstrapErrorCode::ConfigError,
            Self::Engine(e) => engine_code(e),
            Self::Provision(_) => BootstrapErrorCode::ProvisionFailed,
            Self::Script(e) if e.is_permission_error() => BootstrapErrorCode::PermissionDenied,
            Self::Script(ScriptError::Sql(e)) => engine_code(e),
            Self::Script(_) => BootstrapErrorCode::ScriptFailed,
            Self::Handoff { .. } => BootstrapErrorCode::HandoffFailed,
        }
    }
}

fn engine_code(error: &EngineError) -> BootstrapErrorCode {
    match error {
        EngineError::ConfigCheck { .. } | EngineError::MissingSetting(_) => {
            BootstrapErrorCode::ConfigCheckFailed
        }
        EngineError::Initialize { .. } => BootstrapErrorCode::InitializeFailed,
        // A collaborator that cannot be launched means the server cannot run.
        EngineError::Startup { .. } | EngineError::Spawn { .. } | EngineError::Io(_) => {
            BootstrapErrorCode::StartupFailed
        }
        EngineError::Shutdown { .. } => BootstrapErrorCode::ShutdownFailed,
        EngineError::Sql { .. } | EngineError::Decompress { .. } | EngineError::Timezone { .. } => {
            BootstrapErrorCode::SqlFailed
        }
        EngineError::InvalidTransition { .. } => BootstrapErrorCode::InvalidTransition,
    }
}
