//! Filesystem provisioning
//!
//! - Directory plan, creation and ownership
//! - First-run detection of the data directory

mod detect;
mod directories;
mod errors;

pub use detect::{InitDirectoryClassification, SYSTEM_SCHEMA_DIR};
pub use directories::{resolve_account, DirectoryPlan, FILE_SETTINGS, SECURE_FILE_PRIV};
pub use errors::{ProvisionError, ProvisionResult};
