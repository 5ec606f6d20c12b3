//! Init script dispatch
//!
//! Shell scripts never run inside the entrypoint: both executable and
//! non-executable `.sh` files get a subprocess with a frozen environment
//! snapshot, and nothing they change flows back. SQL scripts run with full
//! root credentials against the temporary server.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::entry::{InitScriptEntry, InitScriptKind};
use super::errors::{ScriptError, ScriptResult};
use crate::config::ChildEnv;
use crate::engine::{Access, SqlInput, SqlSession};
use crate::observability::Logger;

/// Runs init scripts against the temporary server
#[derive(Debug, Clone)]
pub struct InitScriptExecutor {
    shell_bin: PathBuf,
    child_env: ChildEnv,
    database: Option<String>,
}

impl InitScriptExecutor {
    /// `child_env` is the snapshot every shell script sees; `database` is
    /// the default schema for SQL scripts.
    pub fn new(shell_bin: impl Into<PathBuf>, child_env: ChildEnv, database: Option<String>) -> Self {
        Self {
            shell_bin: shell_bin.into(),
            child_env,
            database,
        }
    }

    /// Run every entry in order, stopping at the first failure
    pub fn execute_all<S: SqlSession + ?Sized>(
        &self,
        entries: &[InitScriptEntry],
        root_password: &str,
        session: &mut S,
    ) -> ScriptResult<()> {
        for entry in entries {
            self.execute(entry, root_password, session)?;
        }
        Ok(())
    }

    /// Run one entry
    pub fn execute<S: SqlSession + ?Sized>(
        &self,
        entry: &InitScriptEntry,
        root_password: &str,
        session: &mut S,
    ) -> ScriptResult<()> {
        let path = entry.path.as_path();
        match entry.kind {
            InitScriptKind::ExecutableShell => {
                Logger::note(&format!("running {}", path.display()), &[]);
                self.run_shell(path, Command::new(path))
            }
            InitScriptKind::SourcedShell => {
                Logger::note(&format!("sourcing {}", path.display()), &[]);
                Logger::warn(
                    &format!(
                        "{} is not executable; running it with {} in a separate process, changes it makes to the environment are not kept",
                        path.display(),
                        self.shell_bin.display()
                    ),
                    &[],
                );
                let mut cmd = Command::new(&self.shell_bin);
                cmd.arg(path);
                self.run_shell(path, cmd)
            }
            InitScriptKind::PlainSql => {
                Logger::note(&format!("running {}", path.display()), &[]);
                self.run_sql(root_password, SqlInput::File(path.to_path_buf()), session)
            }
            InitScriptKind::CompressedSql(codec) => {
                Logger::note(&format!("running {}", path.display()), &[]);
                let input = SqlInput::Compressed {
                    codec,
                    path: path.to_path_buf(),
                };
                self.run_sql(root_password, input, session)
            }
            InitScriptKind::Skip => {
                Logger::warn(&format!("ignoring {}", path.display()), &[]);
                Ok(())
            }
        }
    }

    fn run_shell(&self, path: &Path, mut cmd: Command) -> ScriptResult<()> {
        self.child_env.apply(&mut cmd);
        let status = cmd.status().map_err(|source| ScriptError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;
        if !status.success() {
            return Err(ScriptError::Failed {
                path: path.to_path_buf(),
                status,
            });
        }
        Ok(())
    }

    fn run_sql<S: SqlSession + ?Sized>(
        &self,
        root_password: &str,
        input: SqlInput,
        session: &mut S,
    ) -> ScriptResult<()> {
        session.run_sql(Access::Root(root_password), self.database.as_deref(), input)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Codec, RecordingSession};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn executor(marker: &Path) -> InitScriptExecutor {
        let env = ChildEnv::new()
            .with("MYSQL_ROOT_PASSWORD", "rootpw")
            .with("MARKER", marker.to_string_lossy().to_string());
        InitScriptExecutor::new("sh", env, Some("shop".to_string()))
    }

    fn entry(path: PathBuf, kind: InitScriptKind) -> InitScriptEntry {
        InitScriptEntry { path, kind }
    }

    #[test]
    fn test_sql_runs_with_root_and_default_database() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(&dir.path().join("marker"));
        let mut session = RecordingSession::default();

        let plain = dir.path().join("a.sql");
        let packed = dir.path().join("c.sql.gz");
        exec.execute_all(
            &[
                entry(plain.clone(), InitScriptKind::PlainSql),
                entry(packed.clone(), InitScriptKind::CompressedSql(Codec::Gzip)),
            ],
            "rootpw",
            &mut session,
        )
        .unwrap();

        assert_eq!(session.batches.len(), 2);
        assert_eq!(session.batches[0].0.as_deref(), Some("rootpw"));
        assert_eq!(session.batches[0].1.as_deref(), Some("shop"));
        assert_eq!(session.batches[0].2, SqlInput::File(plain));
        assert_eq!(
            session.batches[1].2,
            SqlInput::Compressed {
                codec: Codec::Gzip,
                path: packed
            }
        );
    }

    #[test]
    fn test_executable_script_sees_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = dir.path().join("b.sh");
        fs::write(&script, "#!/bin/sh\necho \"$MYSQL_ROOT_PASSWORD\" > \"$MARKER\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut session = RecordingSession::default();
        executor(&marker)
            .execute(&entry(script, InitScriptKind::ExecutableShell), "rootpw", &mut session)
            .unwrap();

        assert_eq!(fs::read_to_string(&marker).unwrap(), "rootpw\n");
        assert!(session.batches.is_empty());
    }

    #[test]
    fn test_sourced_script_runs_through_shell() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = dir.path().join("b.sh");
        fs::write(&script, "echo sourced > \"$MARKER\"\n").unwrap();

        let mut session = RecordingSession::default();
        executor(&marker)
            .execute(&entry(script, InitScriptKind::SourcedShell), "rootpw", &mut session)
            .unwrap();

        assert_eq!(fs::read_to_string(&marker).unwrap(), "sourced\n");
    }

    #[test]
    fn test_failing_script_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        fs::write(&script, "exit 3\n").unwrap();

        let mut session = RecordingSession::default();
        let err = executor(&dir.path().join("marker"))
            .execute(&entry(script, InitScriptKind::SourcedShell), "rootpw", &mut session)
            .unwrap_err();
        assert!(matches!(err, ScriptError::Failed { .. }));
    }

    #[test]
    fn test_skip_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = RecordingSession::default();
        executor(&dir.path().join("marker"))
            .execute(
                &entry(dir.path().join("notes.txt"), InitScriptKind::Skip),
                "rootpw",
                &mut session,
            )
            .unwrap();
        assert!(session.batches.is_empty());
    }
}
