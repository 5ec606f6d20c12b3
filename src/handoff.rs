//! Process handoff
//!
//! The entrypoint ends by replacing its own process image, either with
//! itself under the service account (privilege drop) or with the final
//! command. `exec` only returns on failure.

use std::ffi::{OsStr, OsString};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use crate::bootstrap::BootstrapError;
use crate::cli::Invocation;
use crate::config::ChildEnv;

/// Why the process is being replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffKind {
    /// Re-execute the entrypoint as the service account
    DropPrivileges,
    /// Run the engine after bootstrap
    Engine,
    /// Run a command the bootstrap does not handle
    Passthrough,
}

/// Terminal process replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    kind: HandoffKind,
    program: OsString,
    args: Vec<OsString>,
    env: ChildEnv,
}

impl Handoff {
    /// Run `invocation` unchanged with the inherited environment
    pub fn passthrough(invocation: Invocation) -> Self {
        let (program, args) = invocation.into_parts();
        Self {
            kind: HandoffKind::Passthrough,
            program,
            args,
            env: ChildEnv::new(),
        }
    }

    /// Run the engine with its original arguments and resolved environment
    pub fn engine(invocation: Invocation, env: ChildEnv) -> Self {
        let (program, args) = invocation.into_parts();
        Self {
            kind: HandoffKind::Engine,
            program,
            args,
            env,
        }
    }

    /// Re-run `entrypoint` with `invocation` through the privilege helper
    pub fn drop_privileges(
        helper: &Path,
        account: &str,
        entrypoint: &Path,
        invocation: Invocation,
        env: ChildEnv,
    ) -> Self {
        let (program, rest) = invocation.into_parts();
        let mut args = vec![
            OsString::from(account),
            entrypoint.as_os_str().to_os_string(),
            program,
        ];
        args.extend(rest);
        Self {
            kind: HandoffKind::DropPrivileges,
            program: helper.as_os_str().to_os_string(),
            args,
            env,
        }
    }

    pub fn kind(&self) -> HandoffKind {
        self.kind
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn env(&self) -> &ChildEnv {
        &self.env
    }

    /// Command that replaces the process
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        self.env.apply(&mut cmd);
        cmd
    }

    /// Replace the current process image.
    ///
    /// Never returns on success; the returned error describes the failure.
    pub fn exec(self) -> BootstrapError {
        let source = self.command().exec();
        BootstrapError::Handoff {
            program: self.program.to_string_lossy().into_owned(),
            source,
        }
    }
}
