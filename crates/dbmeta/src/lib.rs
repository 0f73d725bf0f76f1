//! # dbmeta
//!
//! Keeps a Firebird schema in sync with a directory of SQL definition files.
//!
//! - **Export**: read domains, tables and stored procedures from the system
//!   catalog and write one `CREATE` script per object
//! - **Build**: create a fresh database and apply a scripts directory
//! - **Update**: apply a scripts directory to an existing database
//!
//! Scripts are always applied in the order domains, tables, procedures, and
//! application stops at the first failing file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbmeta::{Config, Orchestrator};
//! use std::path::Path;
//!
//! fn main() -> dbmeta::Result<()> {
//!     let config = Config::from_lookup(|key| std::env::var(key).ok())?;
//!     let orchestrator = Orchestrator::new(config);
//!     let result = orchestrator.export_scripts(None, Path::new("schema"))?;
//!     println!("Exported {} tables", result.tables);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod ddl;
pub mod error;
pub mod firebird;
pub mod orchestrator;
pub mod schema;
pub mod scripts;
pub mod typemap;

// Re-exports for convenient access
pub use catalog::CatalogReader;
pub use config::{Config, ConnectionConfig, NewDatabaseConfig};
pub use error::{MetaError, Result};
pub use orchestrator::{export_schema, ExportResult, Orchestrator};
pub use schema::{
    ColumnDefinition, DomainDefinition, ParameterDirection, ProcedureDefinition,
    ProcedureParameter, TableDefinition, TypeSource,
};
pub use scripts::{apply_scripts, ApplyResult, ScriptCategory, ScriptExecutor, ScriptWriter};
pub use typemap::{map_field_type, FieldDescriptor, FieldType};
