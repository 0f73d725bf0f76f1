//! Read-only queries against the Firebird system tables.

/// User-defined domains with their field descriptors.
pub const DOMAINS: &str = "
    SELECT
        RDB$FIELD_NAME,
        RDB$FIELD_TYPE,
        RDB$FIELD_LENGTH,
        RDB$FIELD_SCALE,
        RDB$FIELD_PRECISION,
        RDB$CHARACTER_LENGTH,
        RDB$FIELD_SUB_TYPE
    FROM RDB$FIELDS
    WHERE (RDB$SYSTEM_FLAG = 0 OR RDB$SYSTEM_FLAG IS NULL)
    ORDER BY RDB$FIELD_NAME";

/// Non-system base tables (views have a BLR).
pub const TABLES: &str = "
    SELECT RDB$RELATION_NAME
    FROM RDB$RELATIONS
    WHERE (RDB$SYSTEM_FLAG = 0 OR RDB$SYSTEM_FLAG IS NULL)
      AND RDB$VIEW_BLR IS NULL
    ORDER BY RDB$RELATION_NAME";

/// Columns of one table in declared order.
pub const TABLE_COLUMNS: &str = "
    SELECT
        rf.RDB$FIELD_NAME,
        rf.RDB$FIELD_POSITION,
        rf.RDB$FIELD_SOURCE,
        f.RDB$FIELD_TYPE,
        f.RDB$FIELD_LENGTH,
        f.RDB$FIELD_SCALE,
        f.RDB$FIELD_PRECISION,
        f.RDB$CHARACTER_LENGTH,
        f.RDB$FIELD_SUB_TYPE,
        rf.RDB$NULL_FLAG
    FROM RDB$RELATION_FIELDS rf
    JOIN RDB$FIELDS f ON rf.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME
    WHERE rf.RDB$RELATION_NAME = ?
    ORDER BY rf.RDB$FIELD_POSITION";

/// Non-system stored procedures with their source text.
pub const PROCEDURES: &str = "
    SELECT
        RDB$PROCEDURE_NAME,
        RDB$PROCEDURE_SOURCE
    FROM RDB$PROCEDURES
    WHERE (RDB$SYSTEM_FLAG = 0 OR RDB$SYSTEM_FLAG IS NULL)
    ORDER BY RDB$PROCEDURE_NAME";

/// Parameters of one procedure, inputs first, then by number.
pub const PROCEDURE_PARAMETERS: &str = "
    SELECT
        pp.RDB$PARAMETER_NAME,
        pp.RDB$PARAMETER_TYPE,
        pp.RDB$PARAMETER_NUMBER,
        pp.RDB$FIELD_SOURCE,
        f.RDB$FIELD_TYPE,
        f.RDB$FIELD_LENGTH,
        f.RDB$FIELD_SCALE,
        f.RDB$FIELD_PRECISION,
        f.RDB$CHARACTER_LENGTH,
        f.RDB$FIELD_SUB_TYPE
    FROM RDB$PROCEDURE_PARAMETERS pp
    JOIN RDB$FIELDS f ON pp.RDB$FIELD_SOURCE = f.RDB$FIELD_NAME
    WHERE pp.RDB$PROCEDURE_NAME = ?
    ORDER BY pp.RDB$PARAMETER_TYPE, pp.RDB$PARAMETER_NUMBER";
