//! Configuration for the entrypoint
//!
//! Two layers:
//! - [`Settings`]: image-level constants (paths, collaborator binaries)
//! - [`RuntimeConfig`]: per-run values resolved from the engine and the
//!   environment, including `_FILE` secret indirection

mod env;
mod errors;
mod runtime;
mod settings;

pub use env::{resolve_secret, ChildEnv, EnvSource, MapEnv, ProcessEnv, FILE_SUFFIX};
pub use errors::{ConfigError, ConfigResult};
pub use runtime::{
    RootPasswordSource, RuntimeConfig, CONSUMED_VARS, DEFAULT_ROOT_HOST, MAX_ROOT_PASSWORD_BYTES,
    MYSQL_ALLOW_EMPTY_PASSWORD, MYSQL_DATABASE, MYSQL_INITDB_SKIP_TZINFO, MYSQL_ONETIME_PASSWORD,
    MYSQL_PASSWORD, MYSQL_RANDOM_ROOT_PASSWORD, MYSQL_ROOT_HOST, MYSQL_ROOT_PASSWORD, MYSQL_USER,
    ROOT_USER,
};
pub use settings::{Settings, DEFAULT_INITDB_DIR, DEFAULT_ZONEINFO_DIR};
