//! Observability for the entrypoint
//!
//! - Timestamped, one-line log events (text or JSON)
//! - Typed lifecycle milestones
//!
//! Observability is write-only: nothing in the bootstrap reads it back.

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogFormat, Logger, Severity, LOG_FORMAT_ENV};

#[cfg(test)]
pub(crate) use logger::capture_output;

/// Log a lifecycle event at Note level
pub fn log_event(event: Event) {
    Logger::note(event.message(), &[("event", event.as_str())]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let mut all = Vec::with_capacity(fields.len() + 1);
    all.push(("event", event.as_str()));
    all.extend_from_slice(fields);
    Logger::note(event.message(), &all);
}
