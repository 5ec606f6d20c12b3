//! CLI module for the entrypoint
//!
//! - argument intake and invocation normalization
//! - `run`: bootstrap, then hand off

mod args;
mod commands;

pub use args::{Cli, Invocation, HELP_FLAGS};
pub use commands::run;
