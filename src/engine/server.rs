//! Temporary server lifecycle
//!
//! # Fresh-init sequence
//!
//! 1. `initialize_data_dir`: create system tables (`--initialize-insecure`)
//! 2. `start`: daemonized, socket-only server; blocks until ready
//! 3. provisioning runs against the socket
//! 4. `stop`: administrative shutdown over the socket
//! 5. `hand_off`: ownership of the data directory passes to the final engine
//!
//! Every step is validated against [`ServerRunState`] before it runs.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::errors::{EngineError, EngineResult};
use super::passfile::Passfile;
use super::state::ServerRunState;
use crate::config::ChildEnv;
use crate::observability::Logger;

/// Engine process used for provisioning
#[derive(Debug)]
pub struct TemporaryServer {
    program: OsString,
    args: Vec<OsString>,
    socket: PathBuf,
    admin_bin: PathBuf,
    child_env: ChildEnv,
    state: ServerRunState,
}

impl TemporaryServer {
    /// Create a lifecycle manager for `program args...`
    pub fn new(
        program: impl Into<OsString>,
        args: Vec<OsString>,
        socket: impl Into<PathBuf>,
        admin_bin: impl Into<PathBuf>,
        child_env: ChildEnv,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            socket: socket.into(),
            admin_bin: admin_bin.into(),
            child_env,
            state: ServerRunState::NotStarted,
        }
    }

    /// Current run state
    pub fn state(&self) -> ServerRunState {
        self.state
    }

    fn engine_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        self.child_env.apply(&mut cmd);
        cmd
    }

    /// Initialize an empty data directory.
    ///
    /// Only valid before any server has been started.
    pub fn initialize_data_dir(&self) -> EngineResult<()> {
        if self.state != ServerRunState::NotStarted {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: ServerRunState::NotStarted,
            });
        }

        let status = self
            .engine_command()
            .arg("--initialize-insecure")
            .arg("--default-time-zone=SYSTEM")
            .status()
            .map_err(|e| EngineError::spawn(&self.program, e))?;

        if !status.success() {
            return Err(EngineError::Initialize { status });
        }
        Ok(())
    }

    /// Start the daemonized, network-less server.
    ///
    /// Returns once the engine reports readiness; a non-zero exit is fatal.
    pub fn start(&mut self) -> EngineResult<()> {
        let target = ServerRunState::TemporaryRunning;
        if !self.state.can_transition_to(target) {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }

        let status = self
            .engine_command()
            .arg("--daemonize")
            .arg("--skip-networking")
            .arg("--default-time-zone=SYSTEM")
            .arg(format!("--socket={}", self.socket.display()))
            .status()
            .map_err(|e| EngineError::spawn(&self.program, e))?;

        if !status.success() {
            return Err(EngineError::Startup { status });
        }
        self.state.transition(target)
    }

    /// Shut the server down using root credentials.
    ///
    /// The credentials live in a transient descriptor for the duration of
    /// the shutdown call only.
    pub fn stop(&mut self, root_password: &str) -> EngineResult<()> {
        let target = ServerRunState::Stopped;
        if !self.state.can_transition_to(target) {
            return Err(EngineError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }

        let passfile = Passfile::new(Some(root_password))?;
        let mut cmd = Command::new(&self.admin_bin);
        cmd.arg(passfile.option_arg())
            .arg("shutdown")
            .arg("-uroot")
            .arg(format!("--socket={}", self.socket.display()));
        self.child_env.apply(&mut cmd);

        let status = cmd
            .status()
            .map_err(|e| EngineError::spawn(&self.admin_bin, e))?;
        drop(passfile);

        if !status.success() {
            return Err(EngineError::Shutdown { status });
        }
        self.state.transition(target)
    }

    /// Record that the final engine now owns the data directory
    pub fn hand_off(&mut self) -> EngineResult<()> {
        self.state.transition(ServerRunState::HandedOff)
    }
}

/// Point the engine's default socket location at the resolved socket.
///
/// Best-effort: failures are logged and reported as `false`.
pub fn reconcile_socket(default_socket: &Path, socket: &Path) -> bool {
    if default_socket == socket {
        return false;
    }

    match link_socket(default_socket, socket) {
        Ok(()) => {
            Logger::note(
                "linked default socket",
                &[
                    ("from", &default_socket.display().to_string()),
                    ("to", &socket.display().to_string()),
                ],
            );
            true
        }
        Err(e) => {
            Logger::warn(
                "unable to link default socket",
                &[
                    ("error", &e.to_string()),
                    ("from", &default_socket.display().to_string()),
                ],
            );
            false
        }
    }
}

fn link_socket(default_socket: &Path, socket: &Path) -> io::Result<()> {
    // Replace a stale link or file, never a directory.
    match fs::symlink_metadata(default_socket) {
        Ok(meta) if !meta.is_dir() => fs::remove_file(default_socket)?,
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::os::unix::fs::symlink(socket, default_socket)
}
