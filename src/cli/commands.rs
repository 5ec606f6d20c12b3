//! CLI entry
//!
//! Parses the command line, runs the bootstrap against the real process
//! environment and replaces the process with the resulting handoff.

use std::convert::Infallible;

use super::args::{Cli, Invocation};
use crate::bootstrap::{Bootstrap, BootstrapError};
use crate::config::{ProcessEnv, Settings};

/// Main CLI entry point
///
/// This is the only function that main.rs should call. It returns only on
/// failure.
pub fn run() -> Result<Infallible, BootstrapError> {
    let cli = Cli::parse_args();
    let settings = Settings::default();
    let invocation = Invocation::normalize(cli.command, &settings.engine_command);

    let handoff = Bootstrap::new(&settings, &ProcessEnv).run(invocation)?;
    Err(handoff.exec())
}
