//! Stub container image for bootstrap tests
//!
//! The engine and its client tools are replaced by POSIX `sh` scripts in a
//! temporary directory. Every invocation is appended to one log file:
//! - `mysqld`: answers the help dump (an option file socket applies unless
//!   `--no-defaults` comes first), creates the system schema on
//!   `--initialize-insecure`, fails `--daemonize` when `fail-start` exists
//! - `mysql`: logs its arguments and the SQL it receives
//! - `mysqladmin`: logs its arguments and the option file it was given
//! - `mysql_tzinfo_to_sql`: emits one statement carrying the benign warning

#![allow(dead_code)]

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use mysql_entrypoint::bootstrap::{Bootstrap, BootstrapResult};
use mysql_entrypoint::cli::Invocation;
use mysql_entrypoint::config::{MapEnv, Settings};
use mysql_entrypoint::handoff::Handoff;
use tempfile::TempDir;

pub struct StubImage {
    pub root: TempDir,
    pub settings: Settings,
    pub data_dir: PathBuf,
    pub socket: PathBuf,
    pub initdb_dir: PathBuf,
    pub log: PathBuf,
}

impl StubImage {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let base = root.path().to_path_buf();
        let bin = base.join("bin");
        let data_dir = base.join("data");
        let run_dir = base.join("run");
        let socket = run_dir.join("mysqld.sock");
        let initdb_dir = base.join("initdb.d");
        let log = base.join("invocations.log");
        fs::create_dir(&bin).unwrap();
        fs::create_dir(&initdb_dir).unwrap();

        let mysqld = write_stub(
            &bin,
            "mysqld",
            &format!(
                r#"echo "mysqld $*" >> '{log}'
sock='{socket}'
if [ "$1" != --no-defaults ] && [ -f '{base}/my.cnf' ]; then
  sock="$(cat '{base}/my.cnf')"
fi
help=
for arg in "$@"; do
  case "$arg" in
    --socket=*) sock="${{arg#--socket=}}" ;;
    --help) help=1 ;;
  esac
done
if [ -n "$help" ]; then
  printf '%s\n' 'Variables (--variable-name=value)'
  printf '%s\n' '--------------------------------- ----------------------------------------'
  printf 'datadir                           %s/\n' '{data}'
  printf 'socket                            %s\n' "$sock"
  printf 'pid-file                          %s/mysqld.pid\n' '{run}'
  printf 'secure-file-priv                  NULL\n'
  exit 0
fi
for arg in "$@"; do
  case "$arg" in
    --initialize-insecure) mkdir -p '{data}/mysql'; exit 0 ;;
    --daemonize) if [ -e '{base}/fail-start' ]; then exit 1; fi; exit 0 ;;
  esac
done
exit 0
"#,
                log = log.display(),
                socket = socket.display(),
                data = data_dir.display(),
                run = run_dir.display(),
                base = base.display(),
            ),
        );

        let mysql = write_stub(
            &bin,
            "mysql",
            &format!(
                r#"{{
  echo "mysql $*"
  cat
  echo "-- end"
}} >> '{log}'
"#,
                log = log.display()
            ),
        );

        let mysqladmin = write_stub(
            &bin,
            "mysqladmin",
            &format!(
                r#"pass="${{1#--defaults-extra-file=}}"
{{
  echo "mysqladmin $*"
  cat "$pass"
}} >> '{log}'
"#,
                log = log.display()
            ),
        );

        let tzinfo = write_stub(
            &bin,
            "mysql_tzinfo_to_sql",
            "echo \"INSERT INTO time_zone_name (Name) VALUES ('Local time zone must be set--see zic manual page');\"\n",
        );

        let settings = Settings {
            engine_command: mysqld.display().to_string(),
            initdb_dir: initdb_dir.clone(),
            zoneinfo_dir: base.join("zoneinfo"),
            client_bin: mysql,
            admin_bin: mysqladmin,
            tzinfo_bin: tzinfo,
            shell_bin: PathBuf::from("sh"),
            privilege_helper: PathBuf::from("gosu"),
            service_account: None,
        };

        Self {
            root,
            settings,
            data_dir,
            socket,
            initdb_dir,
            log,
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Command line with the engine command implied
    pub fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::normalize(
            args.iter().map(OsString::from).collect(),
            &self.settings.engine_command,
        )
    }

    pub fn run(&self, env: &MapEnv, args: &[&str]) -> BootstrapResult<Handoff> {
        Bootstrap::new(&self.settings, env).run(self.invocation(args))
    }

    /// Everything the stubs logged so far
    pub fn log(&self) -> String {
        fs::read_to_string(&self.log).unwrap_or_default()
    }

    pub fn clear_log(&self) {
        let _ = fs::remove_file(&self.log);
    }

    /// Socket set in the stub's option file
    pub fn set_option_file_socket(&self, socket: &Path) {
        fs::write(self.path().join("my.cnf"), socket.display().to_string()).unwrap();
    }

    pub fn fail_start(&self) {
        fs::write(self.path().join("fail-start"), b"").unwrap();
    }

    pub fn add_script(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.initdb_dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

fn write_stub(bin: &Path, name: &str, body: &str) -> PathBuf {
    let path = bin.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Whether gzip is available to build compressed fixtures
pub fn have_gzip() -> bool {
    std::process::Command::new("gzip")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
