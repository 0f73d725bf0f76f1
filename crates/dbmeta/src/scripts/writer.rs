//! Writes generated DDL to per-object script files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{script_file_name, ScriptCategory};
use crate::error::Result;

/// Writes one file per schema object under a scripts root.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    root: PathBuf,
}

impl ScriptWriter {
    /// Create a writer for `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the category directory even when it ends up empty.
    pub fn ensure_category(&self, category: ScriptCategory) -> Result<PathBuf> {
        let dir = category.dir(&self.root);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `ddl` to `<root>/<category>/<object>.sql`, replacing any
    /// existing file. Returns the written path.
    pub fn write(&self, category: ScriptCategory, object: &str, ddl: &str) -> Result<PathBuf> {
        let dir = self.ensure_category(category)?;
        let path = dir.join(script_file_name(object));

        let mut content = ddl.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        fs::write(&path, content)?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
