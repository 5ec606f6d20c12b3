//! Bootstrap lifecycle events
//!
//! Milestones are explicit and typed so every note about bootstrap progress
//! is emitted from one place.

use std::fmt;

/// Observable milestones of a bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Entrypoint started for the engine command
    EntrypointStart,
    /// About to re-execute as the service account
    PrivilegeSwitch,

    // Data directory
    /// Data directory initialization begins
    InitializeBegin,
    /// Data directory initialized
    InitializeComplete,

    // Temporary server
    /// Temporary server starting
    TemporaryServerStart,
    /// Temporary server ready
    TemporaryServerStarted,
    /// Temporary server stopping
    TemporaryServerStop,
    /// Temporary server stopped
    TemporaryServerStopped,

    // Completion
    /// Fresh-init path finished
    InitProcessDone,
    /// Data directory already contains a database
    ExistingDatabase,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::EntrypointStart => "ENTRYPOINT_START",
            Event::PrivilegeSwitch => "PRIVILEGE_SWITCH",
            Event::InitializeBegin => "INITIALIZE_BEGIN",
            Event::InitializeComplete => "INITIALIZE_COMPLETE",
            Event::TemporaryServerStart => "TEMPORARY_SERVER_START",
            Event::TemporaryServerStarted => "TEMPORARY_SERVER_STARTED",
            Event::TemporaryServerStop => "TEMPORARY_SERVER_STOP",
            Event::TemporaryServerStopped => "TEMPORARY_SERVER_STOPPED",
            Event::InitProcessDone => "INIT_PROCESS_DONE",
            Event::ExistingDatabase => "EXISTING_DATABASE",
        }
    }

    /// Human-readable message logged for the event
    pub fn message(&self) -> &'static str {
        match self {
            Event::EntrypointStart => "Entrypoint script for MySQL Server started.",
            Event::PrivilegeSwitch => "Switching to dedicated user",
            Event::InitializeBegin => "Initializing database files",
            Event::InitializeComplete => "Database files initialized",
            Event::TemporaryServerStart => "Starting temporary server",
            Event::TemporaryServerStarted => "Temporary server started.",
            Event::TemporaryServerStop => "Stopping temporary server",
            Event::TemporaryServerStopped => "Temporary server stopped",
            Event::InitProcessDone => "MySQL init process done. Ready for start up.",
            Event::ExistingDatabase => {
                "Database directory appears to contain a database; skipping initialization"
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
