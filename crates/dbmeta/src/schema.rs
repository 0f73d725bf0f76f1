//! Schema object snapshots read from the catalog.
//!
//! These are built fresh for every run and never persisted; the persisted
//! form of each object is its generated DDL file.

use serde::{Deserialize, Serialize};

use crate::typemap::FieldDescriptor;

/// Prefix Firebird reserves for system objects and auto-generated field sources.
pub const SYSTEM_NAME_PREFIX: &str = "RDB$";

/// Check if a catalog name belongs to the engine (case-insensitive `RDB$` prefix).
pub fn is_system_name(name: &str) -> bool {
    name.get(..SYSTEM_NAME_PREFIX.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(SYSTEM_NAME_PREFIX))
        .unwrap_or(false)
}

/// Where a column or parameter gets its type from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSource {
    /// Type declared inline; the field source is an `RDB$` generated name.
    Inline(FieldDescriptor),
    /// Type taken from a user-defined domain.
    Domain(String),
}

impl TypeSource {
    /// Resolve from a field source name and its descriptor.
    pub fn from_field_source(field_source: &str, descriptor: FieldDescriptor) -> Self {
        if is_system_name(field_source) {
            TypeSource::Inline(descriptor)
        } else {
            TypeSource::Domain(field_source.to_string())
        }
    }

    /// Type text as it appears in DDL.
    pub fn to_sql(&self) -> String {
        match self {
            TypeSource::Inline(desc) => desc.sql_type(),
            TypeSource::Domain(name) => name.clone(),
        }
    }
}

/// User-defined domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinition {
    /// Domain name.
    pub name: String,

    /// Underlying field descriptor.
    pub descriptor: FieldDescriptor,
}

impl DomainDefinition {
    /// Mapped SQL type of the domain.
    pub fn sql_type(&self) -> String {
        self.descriptor.sql_type()
    }
}

/// Table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,

    /// `RDB$FIELD_POSITION`.
    pub position: i32,

    /// Inline type or domain reference.
    pub type_source: TypeSource,

    /// False when `RDB$NULL_FLAG` is set.
    pub nullable: bool,
}

/// Base table (views are never included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name.
    pub name: String,

    /// Columns in declared order.
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Sort columns by declared position. Stable, so ties keep catalog order.
    pub fn sort_columns(&mut self) {
        self.columns.sort_by_key(|c| c.position);
    }
}

/// Direction of a procedure parameter (`RDB$PARAMETER_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterDirection {
    /// Input parameter (0).
    In,
    /// Output parameter, declared under `RETURNS` (1).
    Out,
}

impl ParameterDirection {
    /// Decode the catalog value. Anything other than 0 is an output.
    pub fn from_catalog(value: i16) -> Self {
        if value == 0 {
            ParameterDirection::In
        } else {
            ParameterDirection::Out
        }
    }
}

/// Stored procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    /// Parameter name.
    pub name: String,

    /// Input or output.
    pub direction: ParameterDirection,

    /// Inline type or domain reference.
    pub type_source: TypeSource,

    /// `RDB$PARAMETER_NUMBER`.
    pub number: i32,
}

/// Stored procedure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    /// Procedure name.
    pub name: String,

    /// Input parameters in declared order.
    pub input_params: Vec<ProcedureParameter>,

    /// Output parameters in declared order.
    pub output_params: Vec<ProcedureParameter>,

    /// `RDB$PROCEDURE_SOURCE`, empty when the catalog holds none.
    pub body_source: String,
}

impl ProcedureDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Route a parameter into the input or output list by its direction.
    pub fn push_parameter(&mut self, param: ProcedureParameter) {
        match param.direction {
            ParameterDirection::In => self.input_params.push(param),
            ParameterDirection::Out => self.output_params.push(param),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_name_detection() {
        assert!(is_system_name("RDB$12"));
        assert!(is_system_name("rdb$field"));
        assert!(!is_system_name("D_MONEY"));
        assert!(!is_system_name("RDB"));
        assert!(!is_system_name(""));
    }

    #[test]
    fn test_type_source_resolution() {
        let desc = FieldDescriptor::new(8);
        assert_eq!(
            TypeSource::from_field_source("RDB$45", desc),
            TypeSource::Inline(desc)
        );
        assert_eq!(
            TypeSource::from_field_source("D_ID", desc),
            TypeSource::Domain("D_ID".to_string())
        );
        assert_eq!(TypeSource::Domain("D_ID".into()).to_sql(), "D_ID");
        assert_eq!(TypeSource::Inline(desc).to_sql(), "INTEGER");
    }

    #[test]
    fn test_sort_columns_by_position() {
        let mut table = TableDefinition::new("T");
        for (name, pos) in [("B", 1), ("A", 0), ("C", 2)] {
            table.columns.push(ColumnDefinition {
                name: name.to_string(),
                position: pos,
                type_source: TypeSource::Domain("D".into()),
                nullable: true,
            });
        }
        table.sort_columns();
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_push_parameter_routes_by_direction() {
        let mut proc = ProcedureDefinition::new("P");
        proc.push_parameter(ProcedureParameter {
            name: "X".into(),
            direction: ParameterDirection::from_catalog(0),
            type_source: TypeSource::Domain("D".into()),
            number: 0,
        });
        proc.push_parameter(ProcedureParameter {
            name: "Y".into(),
            direction: ParameterDirection::from_catalog(1),
            type_source: TypeSource::Domain("D".into()),
            number: 0,
        });
        assert_eq!(proc.input_params.len(), 1);
        assert_eq!(proc.output_params.len(), 1);
        assert_eq!(proc.output_params[0].name, "Y");
    }
}
