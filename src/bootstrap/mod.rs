//! Bootstrap orchestration
//!
//! Drives the subsystems in order and owns the error taxonomy. The run ends
//! in a [`crate::handoff::Handoff`]; executing it is left to the caller.

mod errors;
mod orchestrator;

pub use errors::{BootstrapError, BootstrapErrorCode, BootstrapResult};
pub use orchestrator::{Bootstrap, MYSQL_VERSION};
