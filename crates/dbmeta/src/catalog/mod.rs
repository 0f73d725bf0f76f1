//! Catalog reading.
//!
//! [`CatalogReader`] is split in two layers: backends supply raw catalog
//! rows (what the `RDB$` queries return), and the provided `read_*` methods
//! assemble them into schema snapshots. The assembly owns the invariants:
//! system domains are dropped, names are trimmed of `CHAR` padding, columns
//! follow their declared position and parameters come inputs first, then by
//! number.

pub mod queries;

use crate::error::Result;
use crate::schema::{
    is_system_name, ColumnDefinition, DomainDefinition, ParameterDirection,
    ProcedureDefinition, ProcedureParameter, TableDefinition, TypeSource,
};
use crate::typemap::FieldDescriptor;

/// One row of [`queries::DOMAINS`].
#[derive(Debug, Clone)]
pub struct DomainRow {
    pub name: String,
    pub descriptor: FieldDescriptor,
}

/// One row of [`queries::TABLE_COLUMNS`].
#[derive(Debug, Clone)]
pub struct ColumnRow {
    pub name: String,
    pub position: Option<i16>,
    pub field_source: String,
    pub descriptor: FieldDescriptor,
    pub null_flag: Option<i16>,
}

/// One row of [`queries::PROCEDURES`].
#[derive(Debug, Clone)]
pub struct ProcedureRow {
    pub name: String,
    pub source: Option<String>,
}

/// One row of [`queries::PROCEDURE_PARAMETERS`].
#[derive(Debug, Clone)]
pub struct ParameterRow {
    pub name: String,
    pub parameter_type: i16,
    pub number: Option<i16>,
    pub field_source: String,
    pub descriptor: FieldDescriptor,
}

/// Read schema objects from a database catalog.
pub trait CatalogReader {
    /// Rows describing every non-system field source, domains included.
    fn domain_rows(&mut self) -> Result<Vec<DomainRow>>;

    /// Names of non-system base tables.
    fn table_names(&mut self) -> Result<Vec<String>>;

    /// Column rows of one table.
    fn column_rows(&mut self, table: &str) -> Result<Vec<ColumnRow>>;

    /// Non-system procedures with their stored source.
    fn procedure_rows(&mut self) -> Result<Vec<ProcedureRow>>;

    /// Parameter rows of one procedure.
    fn parameter_rows(&mut self, procedure: &str) -> Result<Vec<ParameterRow>>;

    /// User-defined domains.
    fn read_domains(&mut self) -> Result<Vec<DomainDefinition>> {
        Ok(self
            .domain_rows()?
            .into_iter()
            .filter_map(domain_from_row)
            .collect())
    }

    /// Base tables with their columns in declared order.
    fn read_tables(&mut self) -> Result<Vec<TableDefinition>> {
        let mut tables = Vec::new();
        for name in self.table_names()? {
            let name = name.trim().to_string();
            let mut table = TableDefinition::new(name.as_str());
            table.columns = self
                .column_rows(&name)?
                .into_iter()
                .map(column_from_row)
                .collect();
            table.sort_columns();
            tables.push(table);
        }
        Ok(tables)
    }

    /// Stored procedures with parameters and body source.
    fn read_procedures(&mut self) -> Result<Vec<ProcedureDefinition>> {
        let mut procedures = Vec::new();
        for row in self.procedure_rows()? {
            let name = row.name.trim().to_string();
            let mut params: Vec<ProcedureParameter> = self
                .parameter_rows(&name)?
                .into_iter()
                .map(parameter_from_row)
                .collect();
            params.sort_by_key(|p| (p.direction, p.number));

            let mut procedure = ProcedureDefinition::new(name);
            procedure.body_source = row.source.unwrap_or_default();
            for param in params {
                procedure.push_parameter(param);
            }
            procedures.push(procedure);
        }
        Ok(procedures)
    }
}

/// Domain for a row, or `None` for engine-generated field sources.
pub fn domain_from_row(row: DomainRow) -> Option<DomainDefinition> {
    let name = row.name.trim();
    if is_system_name(name) {
        return None;
    }
    Some(DomainDefinition {
        name: name.to_string(),
        descriptor: row.descriptor,
    })
}

pub fn column_from_row(row: ColumnRow) -> ColumnDefinition {
    ColumnDefinition {
        name: row.name.trim().to_string(),
        position: row.position.map(i32::from).unwrap_or_default(),
        type_source: TypeSource::from_field_source(row.field_source.trim(), row.descriptor),
        nullable: row.null_flag != Some(1),
    }
}

pub fn parameter_from_row(row: ParameterRow) -> ProcedureParameter {
    ProcedureParameter {
        name: row.name.trim().to_string(),
        direction: ParameterDirection::from_catalog(row.parameter_type),
        type_source: TypeSource::from_field_source(row.field_source.trim(), row.descriptor),
        number: row.number.map(i32::from).unwrap_or_default(),
    }
}
