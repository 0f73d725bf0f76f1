//! Type mapping from Firebird catalog field descriptors to SQL type syntax.
//!
//! A column, domain or procedure parameter is described in `RDB$FIELDS` by a
//! numeric type code plus length, scale, precision and subtype. Several codes
//! share one SQL family: 16/32/64-bit integer storage with a negative scale
//! is an exact numeric, and the subtype decides between `NUMERIC` and
//! `DECIMAL`.
//!
//! Mapping is total. Codes outside the recognized set (including the date,
//! time and boolean codes) map to `BLOB`. That fallback loses information on
//! round trips; callers can check [`FieldDescriptor::is_recognized`] to warn
//! about it.

use serde::{Deserialize, Serialize};

/// Subtype marking an exact numeric declared as `DECIMAL`.
pub const SUBTYPE_DECIMAL: i16 = 2;

/// Type emitted for unrecognized type codes.
pub const FALLBACK_TYPE: &str = "BLOB";

/// Recognized `RDB$FIELD_TYPE` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 16-bit integer storage (code 7).
    Short,
    /// 32-bit integer storage (code 8).
    Long,
    /// Single precision float (code 10).
    Float,
    /// Fixed length text (code 14).
    Char,
    /// 64-bit integer storage (code 16).
    Int64,
    /// Double precision float (code 27).
    Double,
    /// Variable length text (code 37).
    Varchar,
    /// Anything else.
    Other(i32),
}

impl FieldType {
    /// Classify a raw type code.
    pub fn from_code(code: i32) -> Self {
        match code {
            7 => FieldType::Short,
            8 => FieldType::Long,
            10 => FieldType::Float,
            14 => FieldType::Char,
            16 => FieldType::Int64,
            27 => FieldType::Double,
            37 => FieldType::Varchar,
            other => FieldType::Other(other),
        }
    }

    /// Default precision for scaled numerics stored in this integer width.
    fn default_precision(self) -> Option<i32> {
        match self {
            FieldType::Short => Some(4),
            FieldType::Long => Some(9),
            FieldType::Int64 => Some(18),
            _ => None,
        }
    }

    /// Plain integer keyword for this storage width.
    fn integer_keyword(self) -> Option<&'static str> {
        match self {
            FieldType::Short => Some("SMALLINT"),
            FieldType::Long => Some("INTEGER"),
            FieldType::Int64 => Some("BIGINT"),
            _ => None,
        }
    }
}

/// Raw catalog attributes that determine one SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// `RDB$FIELD_TYPE`.
    pub type_code: i32,
    /// `RDB$FIELD_LENGTH` (bytes of storage).
    pub storage_length: i32,
    /// `RDB$FIELD_SCALE`; negative for scaled numerics.
    pub scale: i16,
    /// `RDB$FIELD_PRECISION`.
    pub precision: Option<i16>,
    /// `RDB$CHARACTER_LENGTH`.
    pub character_length: Option<i32>,
    /// `RDB$FIELD_SUB_TYPE`.
    pub subtype: Option<i16>,
}

impl FieldDescriptor {
    /// Descriptor with only a type code set.
    pub fn new(type_code: i32) -> Self {
        Self {
            type_code,
            ..Self::default()
        }
    }

    pub fn with_storage_length(mut self, length: i32) -> Self {
        self.storage_length = length;
        self
    }

    pub fn with_scale(mut self, scale: i16) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_precision(mut self, precision: i16) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_character_length(mut self, length: i32) -> Self {
        self.character_length = Some(length);
        self
    }

    pub fn with_subtype(mut self, subtype: i16) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Classified type code.
    pub fn field_type(&self) -> FieldType {
        FieldType::from_code(self.type_code)
    }

    /// Whether the type code maps to something other than the BLOB fallback.
    pub fn is_recognized(&self) -> bool {
        !matches!(self.field_type(), FieldType::Other(_))
    }

    /// SQL type for this descriptor.
    pub fn sql_type(&self) -> String {
        map_field_type(self)
    }
}

/// Map a catalog field descriptor to a SQL type string.
pub fn map_field_type(desc: &FieldDescriptor) -> String {
    let field_type = desc.field_type();
    match field_type {
        FieldType::Char => format!("CHAR({})", text_length(desc)),
        FieldType::Varchar => format!("VARCHAR({})", text_length(desc)),
        FieldType::Short | FieldType::Long | FieldType::Int64 => {
            integer_or_numeric(field_type, desc)
        }
        FieldType::Float => "FLOAT".to_string(),
        FieldType::Double => "DOUBLE PRECISION".to_string(),
        FieldType::Other(_) => FALLBACK_TYPE.to_string(),
    }
}

fn text_length(desc: &FieldDescriptor) -> i32 {
    desc.character_length.unwrap_or(desc.storage_length)
}

fn integer_or_numeric(field_type: FieldType, desc: &FieldDescriptor) -> String {
    if desc.scale < 0 {
        let scale = -i32::from(desc.scale);
        let precision = match desc.precision {
            Some(p) if p > 0 => i32::from(p),
            _ => field_type.default_precision().unwrap_or(18),
        };
        let keyword = if desc.subtype == Some(SUBTYPE_DECIMAL) {
            "DECIMAL"
        } else {
            "NUMERIC"
        };
        return format!("{}({},{})", keyword, precision, scale);
    }

    field_type.integer_keyword().unwrap_or("INTEGER").to_string()
}
