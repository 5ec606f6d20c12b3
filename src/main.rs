//! docker-entrypoint
//!
//! Minimal entrypoint:
//! 1. Selects the log format
//! 2. Delegates to `cli::run`, which only returns on failure
//! 3. Logs the fatal error with its code and exits non-zero

use mysql_entrypoint::cli;
use mysql_entrypoint::observability::{LogFormat, Logger, LOG_FORMAT_ENV};

fn main() {
    let format = std::env::var(LOG_FORMAT_ENV)
        .map(|name| LogFormat::parse(&name))
        .unwrap_or_default();
    Logger::init(format);

    match cli::run() {
        Ok(never) => match never {},
        Err(e) => {
            Logger::error(&e.to_string(), &[("code", e.code().code())]);
            std::process::exit(1);
        }
    }
}
