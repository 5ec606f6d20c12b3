//! Engine configuration introspection
//!
//! The engine is the authority on its own effective configuration, so paths
//! are read back from its verbose help dump rather than re-derived from
//! option files.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::errors::{EngineError, EngineResult};

pub const DATADIR: &str = "datadir";
pub const SOCKET: &str = "socket";

/// Must be the first engine argument; skips every option file
pub const NO_DEFAULTS: &str = "--no-defaults";

/// Parsed `--verbose --help` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpDump {
    text: String,
}

impl HelpDump {
    /// Wrap captured help output
    pub fn parse(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Value of `key`.
    ///
    /// Matches the first non-indented line whose first whitespace-separated
    /// field equals `key`; the value is the rest of the line after the
    /// separating whitespace.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.text
            .lines()
            .filter(|line| !line.starts_with([' ', '\t']))
            .find_map(|line| {
                let rest = line.strip_prefix(key)?;
                if rest.is_empty() {
                    return Some("");
                }
                if !rest.starts_with([' ', '\t']) {
                    return None;
                }
                Some(rest.trim_start_matches([' ', '\t']))
            })
    }

    /// Value of `key` if it is configured: non-empty and not `NULL`
    pub fn configured(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty() && *v != "NULL")
    }

    /// Value of `key` as a path, failing when it is not configured
    pub fn require_path(&self, key: &str) -> EngineResult<PathBuf> {
        self.configured(key)
            .map(PathBuf::from)
            .ok_or_else(|| EngineError::MissingSetting(key.to_string()))
    }
}

/// Run the engine's verbose help dump with `args` and parse it.
///
/// A throwaway binlog index path keeps the dump free of filesystem side
/// effects. A non-zero exit means the engine rejected its own arguments.
pub fn introspect(program: &OsStr, args: &[OsString]) -> EngineResult<HelpDump> {
    let scratch = std::env::temp_dir().join(format!(
        "mysqld-help-{}-{:016x}",
        std::process::id(),
        rand::random::<u64>()
    ));

    let mut cmd = Command::new(program);
    cmd.args(args)
        .arg("--verbose")
        .arg("--help")
        .arg(format!("--log-bin-index={}", scratch.display()))
        .stdin(Stdio::null());

    let output = cmd.output().map_err(|e| EngineError::spawn(program, e))?;

    if !output.status.success() {
        let mut command = vec![program.to_string_lossy().into_owned()];
        command.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        command.push("--verbose --help".to_string());
        return Err(EngineError::ConfigCheck {
            command: command.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(HelpDump::parse(String::from_utf8_lossy(&output.stdout)))
}

/// Help dump of the engine's compiled-in defaults, ignoring option files.
pub fn introspect_builtin(program: &OsStr) -> EngineResult<HelpDump> {
    introspect(program, &[OsString::from(NO_DEFAULTS)])
}
