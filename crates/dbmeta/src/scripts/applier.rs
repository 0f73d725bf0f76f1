//! Ordered application of definition scripts.
//!
//! Scripts run in three phases, domains, tables, then procedures, because
//! tables reference domains and procedures reference both. Application is
//! fail-fast: the first failing file stops the run, and files already
//! applied stay applied since each one commits on its own.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{list_scripts, ScriptCategory, ScriptExecutor};
use crate::error::{MetaError, Result};

/// Position of an application run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseState {
    Domains,
    Tables,
    Procedures,
    Done,
    Failed,
}

impl PhaseState {
    /// Category applied in this state, `None` once terminal.
    pub fn category(self) -> Option<ScriptCategory> {
        match self {
            PhaseState::Domains => Some(ScriptCategory::Domains),
            PhaseState::Tables => Some(ScriptCategory::Tables),
            PhaseState::Procedures => Some(ScriptCategory::Procedures),
            PhaseState::Done | PhaseState::Failed => None,
        }
    }

    /// State after the current phase succeeds.
    pub fn advance(self) -> Self {
        match self {
            PhaseState::Domains => PhaseState::Tables,
            PhaseState::Tables => PhaseState::Procedures,
            PhaseState::Procedures | PhaseState::Done => PhaseState::Done,
            PhaseState::Failed => PhaseState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.category().is_none()
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Category applied.
    pub category: ScriptCategory,

    /// True when the category directory did not exist.
    pub missing: bool,

    /// Files executed, in order.
    pub executed: Vec<String>,

    /// Blank files that were skipped.
    pub skipped: Vec<String>,
}

/// Outcome of a successful application run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Total scripts executed.
    pub scripts_executed: usize,

    /// Total blank scripts skipped.
    pub scripts_skipped: usize,

    /// Per-phase details, in application order.
    pub phases: Vec<PhaseResult>,
}

impl ApplyResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives the phase sequence over one executor.
pub struct ScriptApplier<'a, E: ScriptExecutor + ?Sized> {
    executor: &'a mut E,
    state: PhaseState,
    phases: Vec<PhaseResult>,
}

impl<'a, E: ScriptExecutor + ?Sized> ScriptApplier<'a, E> {
    pub fn new(executor: &'a mut E) -> Self {
        Self {
            executor,
            state: PhaseState::Domains,
            phases: Vec::new(),
        }
    }

    /// Current state; `Failed` after an aborted run.
    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Phases finished so far.
    pub fn phases(&self) -> &[PhaseResult] {
        &self.phases
    }

    /// Apply every phase under `root`, stopping at the first failure.
    pub fn run(&mut self, root: &Path) -> Result<ApplyResult> {
        let started_at = Utc::now();

        while let Some(category) = self.state.category() {
            match self.apply_phase(root, category) {
                Ok(result) => {
                    self.phases.push(result);
                    self.state = self.state.advance();
                }
                Err(e) => {
                    self.state = PhaseState::Failed;
                    return Err(e);
                }
            }
        }

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        Ok(ApplyResult {
            started_at,
            completed_at,
            duration_seconds: duration,
            scripts_executed: self.phases.iter().map(|p| p.executed.len()).sum(),
            scripts_skipped: self.phases.iter().map(|p| p.skipped.len()).sum(),
            phases: self.phases.clone(),
        })
    }

    fn apply_phase(&mut self, root: &Path, category: ScriptCategory) -> Result<PhaseResult> {
        let dir = category.dir(root);
        let mut result = PhaseResult {
            category,
            missing: false,
            executed: Vec::new(),
            skipped: Vec::new(),
        };

        if !dir.is_dir() {
            warn!("Scripts directory not found, skipping: {}", dir.display());
            result.missing = true;
            return Ok(result);
        }

        info!("Applying {} from {}", category, dir.display());

        for path in list_scripts(&dir)? {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let sql = match fs::read_to_string(&path) {
                Ok(sql) => sql,
                Err(source) => {
                    error!("Cannot read script {}: {}", file, source);
                    return Err(MetaError::ScriptRead { file, source });
                }
            };
            if sql.trim().is_empty() {
                debug!("Skipping blank script {}", file);
                result.skipped.push(file);
                continue;
            }

            if let Err(e) = self.executor.execute_script(&sql) {
                let message = match e {
                    MetaError::Statement(message) => message,
                    other => other.to_string(),
                };
                error!("Error in script {}: {}", file, message);
                return Err(MetaError::script(file, message));
            }

            info!("Executed script: {}", file);
            result.executed.push(file);
        }

        Ok(result)
    }
}

/// Apply all phases under `root` with `executor`.
pub fn apply_scripts<E: ScriptExecutor + ?Sized>(executor: &mut E, root: &Path) -> Result<ApplyResult> {
    ScriptApplier::new(executor).run(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripts::testing::RecordingExecutor;
    use std::path::PathBuf;

    fn write(root: &Path, category: &str, file: &str, sql: &str) -> PathBuf {
        let dir = root.join(category);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        fs::write(&path, sql).unwrap();
        path
    }

    fn scripts_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // Created in reverse dependency order on purpose
        write(root, "procedures", "P1.sql", "CREATE OR ALTER PROCEDURE P1 AS BEGIN END");
        write(root, "tables", "B.sql", "CREATE TABLE B (X D_ID);");
        write(root, "tables", "A.sql", "CREATE TABLE A (X D_ID);");
        write(root, "domains", "D_ID.sql", "CREATE DOMAIN D_ID AS INTEGER;");
        dir
    }

    #[test]
    fn test_phase_state_sequence() {
        let mut state = PhaseState::Domains;
        let mut seen = Vec::new();
        while let Some(category) = state.category() {
            seen.push(category);
            state = state.advance();
        }
        assert_eq!(seen, ScriptCategory::ALL);
        assert_eq!(state, PhaseState::Done);
        assert_eq!(PhaseState::Failed.advance(), PhaseState::Failed);
        assert!(PhaseState::Failed.is_terminal());
    }

    #[test]
    fn test_phases_run_in_dependency_order() {
        let dir = scripts_tree();
        let mut executor = RecordingExecutor::default();

        let result = apply_scripts(&mut executor, dir.path()).unwrap();

        assert_eq!(
            executor.executed,
            [
                "CREATE DOMAIN D_ID AS INTEGER;",
                "CREATE TABLE A (X D_ID);",
                "CREATE TABLE B (X D_ID);",
                "CREATE OR ALTER PROCEDURE P1 AS BEGIN END",
            ]
        );
        assert_eq!(result.scripts_executed, 4);
        assert_eq!(result.phases.len(), 3);
    }

    #[test]
    fn test_failure_stops_remaining_phases() {
        let dir = scripts_tree();
        let mut executor = RecordingExecutor::failing_on("CREATE TABLE A");
        let mut applier = ScriptApplier::new(&mut executor);

        let err = applier.run(dir.path()).unwrap_err();

        assert_eq!(applier.state(), PhaseState::Failed);
        assert_eq!(applier.phases().len(), 1);
        match err {
            MetaError::ScriptExecution { file, message } => {
                assert_eq!(file, "A.sql");
                assert!(message.contains("CREATE TABLE A"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Domain stays applied; nothing after the failing table runs
        assert_eq!(executor.executed, ["CREATE DOMAIN D_ID AS INTEGER;"]);
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tables", "T.sql", "CREATE TABLE T (X INTEGER);");
        let mut executor = RecordingExecutor::default();

        let result = apply_scripts(&mut executor, dir.path()).unwrap();

        assert!(result.phases[0].missing);
        assert!(!result.phases[1].missing);
        assert!(result.phases[2].missing);
        assert_eq!(executor.executed.len(), 1);
    }

    #[test]
    fn test_blank_scripts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "domains", "EMPTY.sql", "  \n\t\n");
        write(dir.path(), "domains", "D.sql", "CREATE DOMAIN D AS INTEGER;");
        let mut executor = RecordingExecutor::default();

        let result = apply_scripts(&mut executor, dir.path()).unwrap();

        assert_eq!(result.scripts_executed, 1);
        assert_eq!(result.scripts_skipped, 1);
        assert_eq!(result.phases[0].skipped, ["EMPTY.sql"]);
    }

    #[test]
    fn test_unreadable_script_names_file() {
        let dir = scripts_tree();
        let bad = dir.path().join("tables").join("BAD.sql");
        fs::write(&bad, [0xff, 0xfe, b'x']).unwrap();
        let mut executor = RecordingExecutor::default();
        let mut applier = ScriptApplier::new(&mut executor);

        let err = applier.run(dir.path()).unwrap_err();

        assert_eq!(applier.state(), PhaseState::Failed);
        assert_eq!(err.exit_code(), crate::error::EXIT_IO_ERROR);
        assert!(matches!(&err, MetaError::ScriptRead { file, .. } if file == "BAD.sql"));
        assert!(err.to_string().contains("BAD.sql"));
        // Files sorted before BAD.sql ran; no procedure did
        assert_eq!(executor.executed.len(), 3);
        assert!(executor.executed.iter().all(|sql| !sql.contains("PROCEDURE")));
    }

    #[test]
    fn test_result_serializes() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = RecordingExecutor::default();
        let result = apply_scripts(&mut executor, dir.path()).unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"scripts_executed\": 0"));
        assert!(json.contains("\"domains\""));
    }
}
