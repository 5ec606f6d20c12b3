//! SQL execution against the temporary server
//!
//! [`SqlSession`] is the seam between provisioning logic and the client
//! binary: the bootstrapper and the init script executor only ever talk to
//! the trait, and [`MysqlClient`] is the production implementation.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::codec::Codec;
use super::errors::{EngineError, EngineResult};
use super::passfile::Passfile;
use crate::config::ChildEnv;

/// How a statement batch authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// Root without a password; only valid before the root password is set
    Passwordless,
    /// Root with the given password (may be empty)
    Root(&'a str),
}

impl Access<'_> {
    fn password(&self) -> Option<&str> {
        match self {
            Access::Passwordless => None,
            Access::Root(password) => Some(password),
        }
    }
}

/// SQL fed to the client on stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlInput {
    /// Statements held in memory
    Text(String),
    /// Plain SQL file streamed as-is
    File(PathBuf),
    /// Compressed SQL file streamed through an external decompressor
    Compressed { codec: Codec, path: PathBuf },
}

impl SqlInput {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            SqlInput::Text(_) => "inline statements".to_string(),
            SqlInput::File(path) | SqlInput::Compressed { path, .. } => {
                path.display().to_string()
            }
        }
    }
}

/// Executes SQL batches against a running server
pub trait SqlSession {
    /// Run one batch as a single client invocation.
    ///
    /// `database` selects the default schema; `None` leaves it unset.
    fn run_sql(
        &mut self,
        access: Access<'_>,
        database: Option<&str>,
        input: SqlInput,
    ) -> EngineResult<()>;
}

/// `mysql` command-line client connected over the server socket
#[derive(Debug, Clone)]
pub struct MysqlClient {
    client_bin: PathBuf,
    socket: PathBuf,
    child_env: ChildEnv,
}

impl MysqlClient {
    /// Create a client for the server listening on `socket`
    pub fn new(client_bin: impl Into<PathBuf>, socket: impl Into<PathBuf>, child_env: ChildEnv) -> Self {
        Self {
            client_bin: client_bin.into(),
            socket: socket.into(),
            child_env,
        }
    }

    fn command(&self, passfile: &Passfile, database: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.client_bin);
        // The option file must be the first argument.
        cmd.arg(passfile.option_arg())
            .arg("--protocol=socket")
            .arg("-uroot")
            .arg("-hlocalhost")
            .arg(format!("--socket={}", self.socket.display()))
            .arg("--comments");
        if let Some(database) = database {
            cmd.arg(format!("--database={}", database));
        }
        self.child_env.apply(&mut cmd);
        cmd
    }
}

impl SqlSession for MysqlClient {
    fn run_sql(
        &mut self,
        access: Access<'_>,
        database: Option<&str>,
        input: SqlInput,
    ) -> EngineResult<()> {
        let passfile = Passfile::new(access.password())?;
        let mut cmd = self.command(&passfile, database);
        let context = input.describe();

        let status = match input {
            SqlInput::Text(sql) => {
                let mut child = cmd
                    .stdin(Stdio::piped())
                    .spawn()
                    .map_err(|e| EngineError::spawn(&self.client_bin, e))?;
                if let Some(mut stdin) = child.stdin.take() {
                    // A client that exits early is reported through its status.
                    if let Err(e) = stdin.write_all(sql.as_bytes()) {
                        if e.kind() != std::io::ErrorKind::BrokenPipe {
                            return Err(e.into());
                        }
                    }
                }
                child.wait()?
            }
            SqlInput::File(path) => {
                let file = File::open(&path)?;
                cmd.stdin(Stdio::from(file))
                    .status()
                    .map_err(|e| EngineError::spawn(&self.client_bin, e))?
            }
            SqlInput::Compressed { codec, path } => {
                let mut decompress = codec
                    .command(&path)
                    .stdout(Stdio::piped())
                    .spawn()
                    .map_err(|e| EngineError::spawn(codec.program(), e))?;
                let stream = decompress
                    .stdout
                    .take()
                    .ok_or_else(|| std::io::Error::other("decompressor stdout unavailable"))?;
                let client = cmd.stdin(Stdio::from(stream)).status();
                // Close our copy of the read end so the decompressor cannot block.
                drop(cmd);
                let codec_status = decompress.wait()?;

                let status = client.map_err(|e| EngineError::spawn(&self.client_bin, e))?;
                if !status.success() {
                    return Err(EngineError::Sql { context, status });
                }
                if !codec_status.success() {
                    return Err(EngineError::Decompress {
                        program: codec.program(),
                        path,
                        status: codec_status,
                    });
                }
                status
            }
        };
        drop(passfile);

        if !status.success() {
            return Err(EngineError::Sql { context, status });
        }
        Ok(())
    }
}

/// Records batches instead of executing them
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub batches: Vec<(Option<String>, Option<String>, SqlInput)>,
}

#[cfg(test)]
impl SqlSession for RecordingSession {
    fn run_sql(
        &mut self,
        access: Access<'_>,
        database: Option<&str>,
        input: SqlInput,
    ) -> EngineResult<()> {
        self.batches.push((
            access.password().map(str::to_string),
            database.map(str::to_string),
            input,
        ));
        Ok(())
    }
}
