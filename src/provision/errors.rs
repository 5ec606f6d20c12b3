//! Filesystem provisioning errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for provisioning
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Provisioning errors
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("service account '{0}' does not exist")]
    UnknownAccount(String),

    #[error("failed to look up service account '{account}': {source}")]
    AccountLookup {
        account: String,
        #[source]
        source: nix::Error,
    },

    #[error("failed to change owner of {path:?}: {source}")]
    Chown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect {path:?}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
