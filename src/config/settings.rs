//! Fixed locations and collaborator binaries
//!
//! These are properties of the container image, not of a particular run, so
//! they are not read from the environment.

use std::path::PathBuf;

/// Well-known init script directory
pub const DEFAULT_INITDB_DIR: &str = "/docker-entrypoint-initdb.d";

/// Well-known zoneinfo database
pub const DEFAULT_ZONEINFO_DIR: &str = "/usr/share/zoneinfo";

/// Image-level settings of the entrypoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Command name that triggers the bootstrap (`mysqld`)
    pub engine_command: String,

    /// Directory scanned for init scripts
    pub initdb_dir: PathBuf,

    /// Timezone database fed to the tzinfo compiler
    pub zoneinfo_dir: PathBuf,

    /// SQL client binary
    pub client_bin: PathBuf,

    /// Administrative client used for shutdown
    pub admin_bin: PathBuf,

    /// Timezone-to-SQL compiler
    pub tzinfo_bin: PathBuf,

    /// Interpreter for non-executable `.sh` init scripts
    pub shell_bin: PathBuf,

    /// Helper that re-executes a command as another account
    pub privilege_helper: PathBuf,

    /// Account that owns the data directory. `None` disables ownership
    /// reassignment and privilege drop.
    pub service_account: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine_command: "mysqld".to_string(),
            initdb_dir: PathBuf::from(DEFAULT_INITDB_DIR),
            zoneinfo_dir: PathBuf::from(DEFAULT_ZONEINFO_DIR),
            client_bin: PathBuf::from("mysql"),
            admin_bin: PathBuf::from("mysqladmin"),
            tzinfo_bin: PathBuf::from("mysql_tzinfo_to_sql"),
            shell_bin: PathBuf::from("bash"),
            privilege_helper: PathBuf::from("gosu"),
            service_account: Some("mysql".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.engine_command, "mysqld");
        assert_eq!(settings.initdb_dir, PathBuf::from("/docker-entrypoint-initdb.d"));
        assert_eq!(settings.service_account.as_deref(), Some("mysql"));
    }
}
