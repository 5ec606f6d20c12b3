//! Server run state machine
//!
//! - States are explicit and enumerable
//! - Transitions are strictly linear, no state is re-entered
//!
//! ```text
//! NotStarted ──► TemporaryRunning ──► Stopped ──► HandedOff
//!     │                                              ▲
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The direct `NotStarted → HandedOff` edge is the pre-existing data path.

use std::fmt;

use super::errors::{EngineError, EngineResult};

/// Run state of the engine as seen by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRunState {
    /// No engine process has been started
    NotStarted,
    /// Temporary, socket-only server is running
    TemporaryRunning,
    /// Temporary server has been shut down
    Stopped,
    /// Orchestrator has been replaced by the final engine
    HandedOff,
}

impl ServerRunState {
    /// Returns the state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::TemporaryRunning => "TemporaryRunning",
            Self::Stopped => "Stopped",
            Self::HandedOff => "HandedOff",
        }
    }

    /// Whether `self → to` is an allowed edge
    pub fn can_transition_to(&self, to: ServerRunState) -> bool {
        matches!(
            (self, to),
            (Self::NotStarted, Self::TemporaryRunning)
                | (Self::TemporaryRunning, Self::Stopped)
                | (Self::Stopped, Self::HandedOff)
                | (Self::NotStarted, Self::HandedOff)
        )
    }

    /// Validate and perform `self → to`
    pub fn transition(&mut self, to: ServerRunState) -> EngineResult<()> {
        if !self.can_transition_to(to) {
            return Err(EngineError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }
}

impl fmt::Display for ServerRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
