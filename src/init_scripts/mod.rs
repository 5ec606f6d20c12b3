//! User-supplied initialization scripts
//!
//! Discovered once from the init script directory and dispatched by suffix:
//! `.sh`, `.sql`, `.sql.{bz2,gz,xz,zst}`. Anything else is skipped with a
//! warning.

mod entry;
mod errors;
mod executor;

pub use entry::{discover, InitScriptEntry, InitScriptKind};
pub use errors::{ScriptError, ScriptResult};
pub use executor::InitScriptExecutor;
