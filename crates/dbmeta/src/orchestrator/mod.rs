//! Workflow coordinator for the build, export and update use cases.
//!
//! Each run owns one connection for its whole duration; the connection is
//! closed explicitly on success and dropped (detached) on every error path.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::CatalogReader;
use crate::config::{validate_new_database, Config, ConnectionConfig};
use crate::ddl::{domain_ddl, procedure_ddl, table_ddl};
use crate::error::{MetaError, Result};
use crate::firebird;
use crate::scripts::{apply_scripts, ApplyResult, ScriptCategory, ScriptWriter};

/// Database file extension appended by build-db.
pub const DATABASE_EXTENSION: &str = ".fdb";

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    /// Scripts root that was written.
    pub output_dir: PathBuf,

    /// When the export started.
    pub started_at: DateTime<Utc>,

    /// When the export completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Domains exported.
    pub domains: usize,

    /// Tables exported.
    pub tables: usize,

    /// Procedures exported.
    pub procedures: usize,

    /// Every file written, in write order.
    pub files: Vec<PathBuf>,

    /// Objects whose file name matched an earlier object's and replaced it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<String>,
}

impl ExportResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the use cases with an explicit configuration.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a new database from `db_dir` and apply every script phase.
    pub fn build_db(&self, db_dir: &str, scripts_dir: &Path) -> Result<ApplyResult> {
        let db_path = database_file_path(db_dir)?;
        validate_new_database(&self.config.new_database)?;

        let db_path = absolute_database_path(&db_path)?;
        let database = db_path.to_string_lossy();

        info!("Building database {} from {}", database, scripts_dir.display());

        let mut conn = firebird::create_database(&self.config.new_database, &database)?;
        let result = apply_scripts(&mut conn, scripts_dir)?;
        info!(
            "Build of {} completed: {} scripts executed in {:.2}s",
            conn.database(),
            result.scripts_executed,
            result.duration_seconds
        );
        conn.close()?;

        Ok(result)
    }

    /// Export domains, tables and procedures of an existing database.
    pub fn export_scripts(
        &self,
        connection_string: Option<&str>,
        output_dir: &Path,
    ) -> Result<ExportResult> {
        let connection = self.connection(connection_string)?;

        let mut conn = firebird::connect(&connection)?;
        let result = export_schema(&mut conn, &ScriptWriter::new(output_dir))?;
        info!(
            "Export of {} completed: {} files in {:.2}s",
            conn.database(),
            result.files.len(),
            result.duration_seconds
        );
        conn.close()?;

        Ok(result)
    }

    /// Apply every script phase to an existing database.
    pub fn update_db(
        &self,
        connection_string: Option<&str>,
        scripts_dir: &Path,
    ) -> Result<ApplyResult> {
        let connection = self.connection(connection_string)?;

        let mut conn = firebird::connect(&connection)?;
        let result = apply_scripts(&mut conn, scripts_dir)?;
        info!(
            "Update of {} completed: {} scripts executed in {:.2}s",
            conn.database(),
            result.scripts_executed,
            result.duration_seconds
        );
        conn.close()?;

        Ok(result)
    }

    fn connection(&self, flag: Option<&str>) -> Result<ConnectionConfig> {
        self.config.resolve_connection_string(flag)?.parse()
    }
}

/// Read the catalog and write one script per object under the writer's root.
///
/// All three category directories are created, even when empty, so the
/// output always has the layout build-db and update-db expect.
pub fn export_schema<R: CatalogReader + ?Sized>(
    reader: &mut R,
    writer: &ScriptWriter,
) -> Result<ExportResult> {
    let started_at = Utc::now();
    let mut files = Vec::new();
    let mut collisions = Vec::new();
    let mut written = HashSet::new();

    for category in ScriptCategory::ALL {
        writer.ensure_category(category)?;
    }

    let mut write = |category: ScriptCategory, object: &str, ddl: String| -> Result<()> {
        let path = writer.write(category, object, &ddl)?;
        if !written.insert(path.clone()) {
            warn!(
                "{} {} replaced an earlier script with the same file name: {}",
                category,
                object,
                path.display()
            );
            collisions.push(object.to_string());
        }
        files.push(path);
        Ok(())
    };

    let domains = reader.read_domains()?;
    for domain in &domains {
        write(ScriptCategory::Domains, &domain.name, domain_ddl(domain))?;
    }
    info!("Exported {} domains", domains.len());

    let tables = reader.read_tables()?;
    for table in &tables {
        write(ScriptCategory::Tables, &table.name, table_ddl(table))?;
    }
    info!("Exported {} tables", tables.len());

    let procedures = reader.read_procedures()?;
    for procedure in &procedures {
        write(ScriptCategory::Procedures, &procedure.name, procedure_ddl(procedure))?;
    }
    info!("Exported {} procedures", procedures.len());

    let completed_at = Utc::now();
    let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

    Ok(ExportResult {
        output_dir: writer.root().to_path_buf(),
        started_at,
        completed_at,
        duration_seconds: duration,
        domains: domains.len(),
        tables: tables.len(),
        procedures: procedures.len(),
        files,
        collisions,
    })
}

/// Database file for a `--db-dir` value: `.fdb` is appended unless already
/// present, and the path must name a parent directory.
pub fn database_file_path(db_dir: &str) -> Result<PathBuf> {
    let trimmed = db_dir.trim();
    let has_extension = trimmed.len() >= DATABASE_EXTENSION.len()
        && trimmed
            .get(trimmed.len() - DATABASE_EXTENSION.len()..)
            .map(|ext| ext.eq_ignore_ascii_case(DATABASE_EXTENSION))
            .unwrap_or(false);

    let path = if has_extension {
        PathBuf::from(trimmed)
    } else {
        PathBuf::from(format!("{}{}", trimmed, DATABASE_EXTENSION))
    };

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(path),
        _ => Err(MetaError::Usage(format!(
            "database path must include a directory: {}",
            db_dir
        ))),
    }
}

/// Create the parent directory and resolve it, since the server interprets
/// relative paths against its own working directory.
fn absolute_database_path(db_path: &Path) -> Result<PathBuf> {
    let parent = db_path
        .parent()
        .ok_or_else(|| MetaError::Usage(format!("no directory in {}", db_path.display())))?;
    let file_name = db_path
        .file_name()
        .ok_or_else(|| MetaError::Usage(format!("no file name in {}", db_path.display())))?;

    fs::create_dir_all(parent)?;
    Ok(fs::canonicalize(parent)?.join(file_name))
}
