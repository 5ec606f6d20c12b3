//! Configuration error types
//!
//! All configuration errors are FATAL: the bootstrap never proceeds on a
//! configuration it cannot interpret unambiguously.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration resolution
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("both {var} and {var}_FILE are set (but are exclusive)")]
    ExclusiveSecret { var: String },

    #[error("unable to read {var}_FILE from {path:?}: {source}")]
    SecretFile {
        var: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Database is uninitialized and password option is not specified\n\
         \tYou need to specify one of the following as an environment variable:\n\
         \t- MYSQL_ROOT_PASSWORD\n\
         \t- MYSQL_ALLOW_EMPTY_PASSWORD\n\
         \t- MYSQL_RANDOM_ROOT_PASSWORD"
    )]
    MissingRootPassword,

    #[error(
        "MYSQL_USER=\"root\", MYSQL_USER and MYSQL_PASSWORD are for configuring a regular user \
         and cannot be used for the root user\n\
         \tRemove MYSQL_USER=\"root\" and use one of the following to control the root user password:\n\
         \t- MYSQL_ROOT_PASSWORD\n\
         \t- MYSQL_ALLOW_EMPTY_PASSWORD\n\
         \t- MYSQL_RANDOM_ROOT_PASSWORD"
    )]
    ReservedUsername,

    #[error("MYSQL_ROOT_PASSWORD is {len} bytes long, at most {max} are supported")]
    RootPasswordTooLong { len: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_secret_names_both_forms() {
        let err = ConfigError::ExclusiveSecret {
            var: "MYSQL_PASSWORD".into(),
        };
        let display = err.to_string();
        assert!(display.contains("MYSQL_PASSWORD and MYSQL_PASSWORD_FILE"));
    }

    #[test]
    fn test_missing_root_password_lists_options() {
        let display = ConfigError::MissingRootPassword.to_string();
        assert!(display.contains("MYSQL_ROOT_PASSWORD"));
        assert!(display.contains("MYSQL_ALLOW_EMPTY_PASSWORD"));
        assert!(display.contains("MYSQL_RANDOM_ROOT_PASSWORD"));
    }
}
