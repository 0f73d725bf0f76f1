//! Definition script files on disk.
//!
//! A scripts root holds one subdirectory per [`ScriptCategory`], each with
//! one `<object>.sql` file per schema object.

mod applier;
mod writer;

pub use applier::{apply_scripts, ApplyResult, PhaseResult, PhaseState, ScriptApplier};
pub use writer::ScriptWriter;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Script file extension.
pub const SCRIPT_EXTENSION: &str = "sql";

/// Object category, which is also the application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptCategory {
    Domains,
    Tables,
    Procedures,
}

impl ScriptCategory {
    /// All categories in dependency order.
    pub const ALL: [ScriptCategory; 3] = [
        ScriptCategory::Domains,
        ScriptCategory::Tables,
        ScriptCategory::Procedures,
    ];

    /// Subdirectory name under the scripts root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ScriptCategory::Domains => "domains",
            ScriptCategory::Tables => "tables",
            ScriptCategory::Procedures => "procedures",
        }
    }

    /// Category directory under `root`.
    pub fn dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }
}

impl fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Execute definition scripts against a database.
pub trait ScriptExecutor {
    /// Run the full text of one script as a single statement.
    fn execute_script(&mut self, sql: &str) -> Result<()>;
}

/// File name for a schema object: `<name>.sql` with characters that are
/// invalid in file names replaced by `_`.
pub fn script_file_name(object: &str) -> String {
    let safe: String = object
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", safe, SCRIPT_EXTENSION)
}

/// `.sql` files directly inside `dir`, sorted by file name.
pub fn list_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_sql = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(SCRIPT_EXTENSION))
            .unwrap_or(false);
        if is_sql && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
