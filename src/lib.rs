//! mysql-entrypoint - container bootstrap for the MySQL server
//!
//! Decides whether the data directory is fresh, provisions it through a
//! temporary server when it is, and hands off to the long-running engine.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod handoff;
pub mod init_scripts;
pub mod observability;
pub mod provision;
