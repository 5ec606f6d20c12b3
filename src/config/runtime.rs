//! Resolved runtime configuration
//!
//! Built once per invocation from the engine's reported paths and the
//! environment, immutable thereafter, and passed by reference to every
//! bootstrap component.

use std::path::{Path, PathBuf};

use super::env::{resolve_secret, ChildEnv, EnvSource, FILE_SUFFIX};
use super::errors::{ConfigError, ConfigResult};
use crate::observability::Logger;

pub const MYSQL_ROOT_PASSWORD: &str = "MYSQL_ROOT_PASSWORD";
pub const MYSQL_ALLOW_EMPTY_PASSWORD: &str = "MYSQL_ALLOW_EMPTY_PASSWORD";
pub const MYSQL_RANDOM_ROOT_PASSWORD: &str = "MYSQL_RANDOM_ROOT_PASSWORD";
pub const MYSQL_ROOT_HOST: &str = "MYSQL_ROOT_HOST";
pub const MYSQL_DATABASE: &str = "MYSQL_DATABASE";
pub const MYSQL_USER: &str = "MYSQL_USER";
pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
pub const MYSQL_INITDB_SKIP_TZINFO: &str = "MYSQL_INITDB_SKIP_TZINFO";
pub const MYSQL_ONETIME_PASSWORD: &str = "MYSQL_ONETIME_PASSWORD";

/// Every variable the bootstrap consumes; each accepts a `_FILE` form
pub const CONSUMED_VARS: [&str; 9] = [
    MYSQL_ROOT_PASSWORD,
    MYSQL_ALLOW_EMPTY_PASSWORD,
    MYSQL_RANDOM_ROOT_PASSWORD,
    MYSQL_ROOT_HOST,
    MYSQL_DATABASE,
    MYSQL_USER,
    MYSQL_PASSWORD,
    MYSQL_INITDB_SKIP_TZINFO,
    MYSQL_ONETIME_PASSWORD,
];

/// Default root host pattern
pub const DEFAULT_ROOT_HOST: &str = "%";

/// Name of the superuser account
pub const ROOT_USER: &str = "root";

/// Longest root password accepted; client credentials travel through a pipe
/// that is filled before the client starts
pub const MAX_ROOT_PASSWORD_BYTES: usize = 4000;

/// Where the root password comes from on the fresh-init path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootPasswordSource {
    /// Generate a random password
    Random,
    /// Use the configured password
    Explicit(String),
    /// Leave the root password empty
    Empty,
}

/// Resolved configuration of one bootstrap run
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    data_dir: PathBuf,
    socket: PathBuf,
    root_host: String,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    root_password: Option<String>,
    allow_empty_password: bool,
    random_root_password: bool,
    skip_tzinfo: bool,
    onetime_password: bool,
    child_env: ChildEnv,
}

impl RuntimeConfig {
    /// Resolve configuration from the environment.
    ///
    /// Fails on any variable given in both direct and `_FILE` form, and on a
    /// reserved application username.
    pub fn resolve<E: EnvSource + ?Sized>(
        env: &E,
        data_dir: PathBuf,
        socket: PathBuf,
    ) -> ConfigResult<Self> {
        let mut child_env = ChildEnv::new();
        let mut resolved = |var: &str| -> ConfigResult<Option<String>> {
            let value = resolve_secret(env, var)?;
            child_env.remove(format!("{}{}", var, FILE_SUFFIX));
            if let Some(ref v) = value {
                child_env.set(var, v.clone());
            }
            Ok(value)
        };

        let root_password = resolved(MYSQL_ROOT_PASSWORD)?;
        let allow_empty_password = resolved(MYSQL_ALLOW_EMPTY_PASSWORD)?.is_some();
        let random_root_password = resolved(MYSQL_RANDOM_ROOT_PASSWORD)?.is_some();
        let root_host = resolved(MYSQL_ROOT_HOST)?;
        let database = resolved(MYSQL_DATABASE)?;
        let user = resolved(MYSQL_USER)?;
        let password = resolved(MYSQL_PASSWORD)?;
        let skip_tzinfo = resolved(MYSQL_INITDB_SKIP_TZINFO)?.is_some();
        let onetime_password = resolved(MYSQL_ONETIME_PASSWORD)?.is_some();

        let root_host = match root_host {
            Some(host) => host,
            None => {
                child_env.set(MYSQL_ROOT_HOST, DEFAULT_ROOT_HOST);
                DEFAULT_ROOT_HOST.to_string()
            }
        };

        if user.as_deref() == Some(ROOT_USER) {
            return Err(ConfigError::ReservedUsername);
        }

        Ok(Self {
            data_dir,
            socket,
            root_host,
            database,
            user,
            password,
            root_password,
            allow_empty_password,
            random_root_password,
            skip_tzinfo,
            onetime_password,
            child_env,
        })
    }

    /// Check the minimum environment for initializing a fresh data directory.
    ///
    /// A root password option is required. Username/password mismatches are
    /// warnings only.
    pub fn verify_minimum(&self) -> ConfigResult<RootPasswordSource> {
        let source = self.root_password_source()?;

        match (&self.user, &self.password) {
            (Some(_), None) => Logger::warn(
                "MYSQL_USER specified, but missing MYSQL_PASSWORD; MYSQL_USER will not be created",
                &[],
            ),
            (None, Some(_)) => Logger::warn(
                "MYSQL_PASSWORD specified, but missing MYSQL_USER; MYSQL_PASSWORD will be ignored",
                &[],
            ),
            _ => {}
        }

        Ok(source)
    }

    /// Pick the root password source.
    ///
    /// When several options are set, random wins over explicit, and explicit
    /// wins over empty.
    pub fn root_password_source(&self) -> ConfigResult<RootPasswordSource> {
        let given = [
            self.random_root_password,
            self.root_password.is_some(),
            self.allow_empty_password,
        ]
        .iter()
        .filter(|set| **set)
        .count();

        let source = if self.random_root_password {
            RootPasswordSource::Random
        } else if let Some(ref password) = self.root_password {
            if password.len() > MAX_ROOT_PASSWORD_BYTES {
                return Err(ConfigError::RootPasswordTooLong {
                    len: password.len(),
                    max: MAX_ROOT_PASSWORD_BYTES,
                });
            }
            RootPasswordSource::Explicit(password.clone())
        } else if self.allow_empty_password {
            RootPasswordSource::Empty
        } else {
            return Err(ConfigError::MissingRootPassword);
        };

        if given > 1 {
            let chosen = match source {
                RootPasswordSource::Random => MYSQL_RANDOM_ROOT_PASSWORD,
                RootPasswordSource::Explicit(_) => MYSQL_ROOT_PASSWORD,
                RootPasswordSource::Empty => MYSQL_ALLOW_EMPTY_PASSWORD,
            };
            Logger::warn(
                "more than one root password option is set",
                &[("using", chosen)],
            );
        }

        Ok(source)
    }

    /// Data directory reported by the engine
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Socket path reported by the engine
    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Host pattern for the additional root account
    pub fn root_host(&self) -> &str {
        &self.root_host
    }

    /// Application database name
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Application user name
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Application user password
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Explicit root password, if configured
    pub fn root_password(&self) -> Option<&str> {
        self.root_password.as_deref()
    }

    /// Whether timezone loading is skipped
    pub fn skip_tzinfo(&self) -> bool {
        self.skip_tzinfo
    }

    /// Whether the root password is expired after provisioning
    pub fn onetime_password(&self) -> bool {
        self.onetime_password
    }

    /// Environment overlay for child processes
    pub fn child_env(&self) -> &ChildEnv {
        &self.child_env
    }
}
