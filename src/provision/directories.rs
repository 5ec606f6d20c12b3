//! Directories the engine needs before it can start
//!
//! The plan is derived from the engine's own configuration:
//! - the socket's parent directory
//! - the data directory
//! - parents of configured log, pid and keyring files
//! - the secure-file-priv directory itself

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User};

use super::errors::{ProvisionError, ProvisionResult};
use crate::engine::HelpDump;

/// File-valued settings whose parent directory must exist
pub const FILE_SETTINGS: [&str; 4] = [
    "general-log-file",
    "keyring_file_data",
    "pid-file",
    "slow-query-log-file",
];

/// Directory-valued setting, used as-is
pub const SECURE_FILE_PRIV: &str = "secure-file-priv";

/// Ordered, de-duplicated set of directories to provision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPlan {
    dirs: BTreeSet<PathBuf>,
}

impl DirectoryPlan {
    /// Build the plan from the engine configuration.
    ///
    /// Settings that are empty or `NULL` contribute nothing.
    pub fn from_engine(dump: &HelpDump, data_dir: &Path, socket: &Path) -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(parent_dir(socket));
        dirs.insert(data_dir.to_path_buf());

        for key in FILE_SETTINGS {
            if let Some(value) = dump.configured(key) {
                dirs.insert(parent_dir(Path::new(value)));
            }
        }
        if let Some(value) = dump.configured(SECURE_FILE_PRIV) {
            dirs.insert(PathBuf::from(value));
        }

        Self { dirs }
    }

    /// Planned directories in order
    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Create every directory; existing ones are not an error
    pub fn create(&self) -> ProvisionResult<()> {
        for dir in &self.dirs {
            fs::create_dir_all(dir).map_err(|source| ProvisionError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Recursively hand every planned directory and its contents to `owner`.
    ///
    /// Symlinks are not followed, and entries already owned by `owner` are
    /// left untouched. Returns the number of entries changed.
    pub fn assign_owner(&self, owner: Uid) -> ProvisionResult<usize> {
        let mut changed = 0;
        for dir in &self.dirs {
            chown_tree(dir, owner.as_raw(), &mut changed)?;
        }
        Ok(changed)
    }
}

/// Look up the uid of the service account
pub fn resolve_account(name: &str) -> ProvisionResult<Uid> {
    match User::from_name(name) {
        Ok(Some(user)) => Ok(user.uid),
        Ok(None) => Err(ProvisionError::UnknownAccount(name.to_string())),
        Err(source) => Err(ProvisionError::AccountLookup {
            account: name.to_string(),
            source,
        }),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

fn chown_tree(path: &Path, uid: u32, changed: &mut usize) -> ProvisionResult<()> {
    let inspect = |source: io::Error| ProvisionError::Inspect {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::symlink_metadata(path).map_err(inspect)?;
    if meta.uid() != uid {
        std::os::unix::fs::lchown(path, Some(uid), None).map_err(|source| {
            ProvisionError::Chown {
                path: path.to_path_buf(),
                source,
            }
        })?;
        *changed += 1;
    }

    if meta.is_dir() {
        for entry in fs::read_dir(path).map_err(inspect)? {
            let entry = entry.map_err(inspect)?;
            chown_tree(&entry.path(), uid, changed)?;
        }
    }
    Ok(())
}
