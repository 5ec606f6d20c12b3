//! Timezone table loading
//!
//! The zoneinfo compiler emits a known warning as part of its SQL output.
//! Known benign warnings are listed explicitly and rewritten before the SQL
//! reaches the server; matching is exact and case-sensitive.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::engine::{Access, EngineError, EngineResult, SqlInput, SqlSession};

/// Known benign compiler output and its replacement
pub const BENIGN_TZ_WARNINGS: &[(&str, &str)] =
    &[("Local time zone must be set--see zic manual page", "FCTY")];

/// Schema holding the timezone tables
pub const SYSTEM_SCHEMA: &str = "mysql";

/// Rewrite every known benign warning in `sql`
pub fn filter_benign_warnings(sql: &str) -> String {
    BENIGN_TZ_WARNINGS
        .iter()
        .fold(sql.to_string(), |acc, (warning, replacement)| {
            acc.replace(warning, replacement)
        })
}

/// Compile the zoneinfo database to SQL
pub fn timezone_sql(tzinfo_bin: &Path, zoneinfo_dir: &Path) -> EngineResult<String> {
    let output = Command::new(tzinfo_bin)
        .arg(zoneinfo_dir)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|e| EngineError::spawn(tzinfo_bin, e))?;

    if !output.status.success() {
        return Err(EngineError::Timezone {
            status: output.status,
        });
    }
    Ok(filter_benign_warnings(&String::from_utf8_lossy(&output.stdout)))
}

/// Load timezone definitions into the system schema.
///
/// Runs before the root password is set, so no password is used.
pub fn load_timezones<S: SqlSession + ?Sized>(
    tzinfo_bin: &Path,
    zoneinfo_dir: &Path,
    session: &mut S,
) -> EngineResult<()> {
    let sql = timezone_sql(tzinfo_bin, zoneinfo_dir)?;
    session.run_sql(Access::Passwordless, Some(SYSTEM_SCHEMA), SqlInput::Text(sql))
}
