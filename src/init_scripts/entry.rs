//! Init script discovery and classification

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

use super::errors::{ScriptError, ScriptResult};
use crate::engine::Codec;

/// What to do with an init script, decided by file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitScriptKind {
    /// Executable `.sh`: run as a subprocess
    ExecutableShell,
    /// Non-executable `.sh`: run through the shell interpreter
    SourcedShell,
    /// `.sql`
    PlainSql,
    /// `.sql.<ext>` for a supported codec
    CompressedSql(Codec),
    /// Anything else, including directories
    Skip,
}

impl InitScriptKind {
    /// Classify a regular file by name and execute permission
    pub fn classify(file_name: &str, executable: bool) -> Self {
        if file_name.ends_with(".sh") {
            return if executable {
                Self::ExecutableShell
            } else {
                Self::SourcedShell
            };
        }
        if file_name.ends_with(".sql") {
            return Self::PlainSql;
        }
        Codec::ALL
            .into_iter()
            .find(|codec| file_name.ends_with(&format!(".sql.{}", codec.extension())))
            .map(Self::CompressedSql)
            .unwrap_or(Self::Skip)
    }
}

impl fmt::Display for InitScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutableShell => write!(f, "executable shell"),
            Self::SourcedShell => write!(f, "sourced shell"),
            Self::PlainSql => write!(f, "sql"),
            Self::CompressedSql(codec) => write!(f, "sql via {}", codec),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// One entry of the init script directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitScriptEntry {
    pub path: PathBuf,
    pub kind: InitScriptKind,
}

impl InitScriptEntry {
    /// Inspect `path` and classify it
    pub fn inspect(path: PathBuf) -> Self {
        let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);
        let kind = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_file => {
                InitScriptKind::classify(name, access(&path, AccessFlags::X_OK).is_ok())
            }
            _ => InitScriptKind::Skip,
        };
        Self { path, kind }
    }
}

/// List the init script directory.
///
/// Non-recursive, sorted by file name, hidden entries excluded. A directory
/// that cannot be listed is an error, so a permissions mistake never
/// silently skips every script.
pub fn discover(dir: &Path) -> ScriptResult<Vec<InitScriptEntry>> {
    let unreadable = |source| ScriptError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let name = entry.map_err(unreadable)?.file_name();
        if !name.as_encoded_bytes().starts_with(b".") {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| InitScriptEntry::inspect(dir.join(name)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_classify_by_suffix() {
        assert_eq!(InitScriptKind::classify("a.sql", false), InitScriptKind::PlainSql);
        assert_eq!(
            InitScriptKind::classify("b.sh", true),
            InitScriptKind::ExecutableShell
        );
        assert_eq!(
            InitScriptKind::classify("b.sh", false),
            InitScriptKind::SourcedShell
        );
        assert_eq!(
            InitScriptKind::classify("c.sql.gz", false),
            InitScriptKind::CompressedSql(Codec::Gzip)
        );
        assert_eq!(
            InitScriptKind::classify("d.sql.bz2", false),
            InitScriptKind::CompressedSql(Codec::Bzip2)
        );
        assert_eq!(
            InitScriptKind::classify("e.sql.xz", false),
            InitScriptKind::CompressedSql(Codec::Xz)
        );
        assert_eq!(
            InitScriptKind::classify("f.sql.zst", false),
            InitScriptKind::CompressedSql(Codec::Zstd)
        );
    }

    #[test]
    fn test_unknown_suffix_skipped() {
        assert_eq!(InitScriptKind::classify("notes.txt", false), InitScriptKind::Skip);
        assert_eq!(InitScriptKind::classify("dump.sql.lz4", false), InitScriptKind::Skip);
        assert_eq!(InitScriptKind::classify("sql", false), InitScriptKind::Skip);
    }

    #[test]
    fn test_discover_sorted_and_classified() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c.sql.gz"), b"").unwrap();
        fs::write(dir.path().join("a.sql"), b"").unwrap();
        fs::write(dir.path().join("b.sh"), b"").unwrap();
        let run = dir.path().join("d.sh");
        fs::write(&run, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&run, fs::Permissions::from_mode(0o755)).unwrap();
        fs::create_dir(dir.path().join("e.sql")).unwrap();
        fs::write(dir.path().join(".hidden.sql"), b"").unwrap();

        let entries = discover(dir.path()).unwrap();
        let summary: Vec<(String, InitScriptKind)> = entries
            .iter()
            .map(|e| {
                (
                    e.path.file_name().unwrap().to_string_lossy().into_owned(),
                    e.kind,
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("a.sql".to_string(), InitScriptKind::PlainSql),
                ("b.sh".to_string(), InitScriptKind::SourcedShell),
                ("c.sql.gz".to_string(), InitScriptKind::CompressedSql(Codec::Gzip)),
                ("d.sh".to_string(), InitScriptKind::ExecutableShell),
                ("e.sql".to_string(), InitScriptKind::Skip),
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("missing")).unwrap_err();
        assert!(err.is_permission_error());
    }
}
