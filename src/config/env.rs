//! Environment intake and the frozen child environment
//!
//! Variables are read through [`EnvSource`] so resolution never depends on
//! (or mutates) process-global state. Everything a child process should see
//! differently from the inherited environment is collected in a [`ChildEnv`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use super::errors::{ConfigError, ConfigResult};

/// Suffix of the secret-indirection form of a variable
pub const FILE_SUFFIX: &str = "_FILE";

/// Read-only source of environment variables
pub trait EnvSource {
    /// Value of `key`, if set
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating the empty string as unset
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Resolve `var` from its direct form or its `_FILE` form.
///
/// - both forms non-empty: [`ConfigError::ExclusiveSecret`]
/// - only the file form: the file's full contents, untrimmed
/// - neither: `None`
pub fn resolve_secret<E: EnvSource + ?Sized>(env: &E, var: &str) -> ConfigResult<Option<String>> {
    let file_var = format!("{}{}", var, FILE_SUFFIX);
    let direct = env.non_empty(var);
    let file = env.non_empty(&file_var);

    match (direct, file) {
        (Some(_), Some(_)) => Err(ConfigError::ExclusiveSecret {
            var: var.to_string(),
        }),
        (Some(value), None) => Ok(Some(value)),
        (None, Some(path)) => {
            let path = PathBuf::from(path);
            fs::read_to_string(&path)
                .map(Some)
                .map_err(|source| ConfigError::SecretFile {
                    var: var.to_string(),
                    path,
                    source,
                })
        }
        (None, None) => Ok(None),
    }
}

/// Environment overlay applied to every child process.
///
/// Resolved values are exported directly and their `_FILE` counterparts
/// removed, so secondary secret paths never reach a child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildEnv {
    set: BTreeMap<String, String>,
    remove: BTreeSet<String>,
}

impl ChildEnv {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `key=value` to children
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove.remove(&key);
        self.set.insert(key, value.into());
    }

    /// Hide `key` from children
    pub fn remove(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.set.remove(&key);
        self.remove.insert(key);
    }

    /// Copy of this overlay with one more exported variable
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.set(key, value);
        next
    }

    /// Exported value of `key`, if the overlay sets one
    pub fn get(&self, key: &str) -> Option<&str> {
        self.set.get(key).map(String::as_str)
    }

    /// Whether `key` is hidden from children
    pub fn is_removed(&self, key: &str) -> bool {
        self.remove.contains(key)
    }

    /// Apply the overlay to a command before it is spawned
    pub fn apply(&self, cmd: &mut Command) {
        for key in &self.remove {
            cmd.env_remove(key);
        }
        cmd.envs(&self.set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_direct_value() {
        let env = MapEnv::new().with("MYSQL_PASSWORD", "secret");
        assert_eq!(
            resolve_secret(&env, "MYSQL_PASSWORD").unwrap().as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_empty_counts_as_unset() {
        let env = MapEnv::new()
            .with("MYSQL_PASSWORD", "")
            .with("MYSQL_PASSWORD_FILE", "");
        assert_eq!(resolve_secret(&env, "MYSQL_PASSWORD").unwrap(), None);
    }

    #[test]
    fn test_file_value_is_not_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"s3cret\n").unwrap();

        let env = MapEnv::new().with(
            "MYSQL_ROOT_PASSWORD_FILE",
            file.path().to_string_lossy().to_string(),
        );
        assert_eq!(
            resolve_secret(&env, "MYSQL_ROOT_PASSWORD").unwrap().as_deref(),
            Some("s3cret\n")
        );
    }

    #[test]
    fn test_both_forms_rejected() {
        for var in ["MYSQL_ROOT_PASSWORD", "MYSQL_USER", "MYSQL_DATABASE"] {
            let env = MapEnv::new()
                .with(var, "a")
                .with(format!("{}_FILE", var), "/run/secrets/a");
            let err = resolve_secret(&env, var).unwrap_err();
            assert!(matches!(err, ConfigError::ExclusiveSecret { .. }));
        }
    }

    #[test]
    fn test_unreadable_file() {
        let env = MapEnv::new().with("MYSQL_PASSWORD_FILE", "/nonexistent/secret");
        let err = resolve_secret(&env, "MYSQL_PASSWORD").unwrap_err();
        assert!(matches!(err, ConfigError::SecretFile { .. }));
    }

    #[test]
    fn test_child_env_set_and_remove() {
        let mut child = ChildEnv::new();
        child.set("MYSQL_PASSWORD", "x");
        child.remove("MYSQL_PASSWORD_FILE");

        assert_eq!(child.get("MYSQL_PASSWORD"), Some("x"));
        assert!(child.is_removed("MYSQL_PASSWORD_FILE"));

        child.set("MYSQL_PASSWORD_FILE", "again");
        assert!(!child.is_removed("MYSQL_PASSWORD_FILE"));
    }

    #[test]
    fn test_child_env_apply() {
        let mut child = ChildEnv::new();
        child.set("A", "1");
        child.remove("B_FILE");

        let mut cmd = Command::new("true");
        child.apply(&mut cmd);

        let envs: Vec<_> = cmd
            .get_envs()
            .map(|(k, v)| (k.to_string_lossy().to_string(), v.map(|v| v.to_string_lossy().to_string())))
            .collect();
        assert!(envs.contains(&("A".to_string(), Some("1".to_string()))));
        assert!(envs.contains(&("B_FILE".to_string(), None)));
    }
}
