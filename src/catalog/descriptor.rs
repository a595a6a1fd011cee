//! Column descriptor metadata.
//!
//! `ColumnDescriptor` is the typed view of a column's alterable attributes. Existing columns
//! are read from the catalog into descriptors, and callers describe the column they want by
//! building one.

use crate::error::CatalogError;
use std::fmt;
use std::str::FromStr;

/// Engine-neutral numeric type codes.
pub mod data_type {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
    pub const BOOLEAN: i32 = 16;
    pub const OTHER: i32 = 1111;
}

/// Whether a column accepts NULL
///
/// `Unknown` is only ever observed; it is never a valid target for an alteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    NoNulls,
    Nullable,
    Unknown,
}

impl Nullability {
    /// Map a catalog nullability code; anything unrecognized is `Unknown`
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Nullability::NoNulls,
            1 => Nullability::Nullable,
            _ => Nullability::Unknown,
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Nullability::NoNulls => 0,
            Nullability::Nullable => 1,
            Nullability::Unknown => 2,
        }
    }
}

/// The recognized descriptor property keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnProperty {
    Name,
    Type,
    TypeName,
    Precision,
    Scale,
    IsNullable,
    IsAutoIncrement,
    DefaultValue,
}

impl ColumnProperty {
    pub const ALL: [ColumnProperty; 8] = [
        ColumnProperty::Name,
        ColumnProperty::Type,
        ColumnProperty::TypeName,
        ColumnProperty::Precision,
        ColumnProperty::Scale,
        ColumnProperty::IsNullable,
        ColumnProperty::IsAutoIncrement,
        ColumnProperty::DefaultValue,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnProperty::Name => "Name",
            ColumnProperty::Type => "Type",
            ColumnProperty::TypeName => "TypeName",
            ColumnProperty::Precision => "Precision",
            ColumnProperty::Scale => "Scale",
            ColumnProperty::IsNullable => "IsNullable",
            ColumnProperty::IsAutoIncrement => "IsAutoIncrement",
            ColumnProperty::DefaultValue => "DefaultValue",
        }
    }
}

impl fmt::Display for ColumnProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnProperty {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnProperty::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownProperty(s.to_string()))
    }
}

/// The four attributes the target grammar sets together with `ALTER COLUMN ... TYPE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub data_type: i32,
    pub type_name: String,
    pub precision: i32,
    pub scale: i32,
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Numeric type code, see [`data_type`]
    pub data_type: i32,
    pub type_name: String,
    pub precision: i32,
    pub scale: i32,
    pub nullable: Nullability,
    pub auto_increment: bool,
    /// `None` and `Some("")` both mean "no default"
    pub default_value: Option<String>,
}

impl ColumnDescriptor {
    /// Create a nullable column without precision, scale or default
    pub fn new(name: impl Into<String>, data_type: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            type_name: type_name.into(),
            precision: 0,
            scale: 0,
            nullable: Nullability::Nullable,
            auto_increment: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_type(mut self, data_type: i32, type_name: impl Into<String>) -> Self {
        self.data_type = data_type;
        self.type_name = type_name.into();
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_nullability(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    #[must_use]
    pub fn without_default(mut self) -> Self {
        self.default_value = None;
        self
    }

    /// The default value with the empty string folded into `None`
    #[must_use]
    pub fn default_text(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|d| !d.is_empty())
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_text().is_some()
    }

    #[must_use]
    pub fn type_spec(&self) -> TypeSpec {
        TypeSpec {
            data_type: self.data_type,
            type_name: self.type_name.clone(),
            precision: self.precision,
            scale: self.scale,
        }
    }

    /// Properties whose values differ from `other`, in `ColumnProperty::ALL` order
    #[must_use]
    pub fn differing_properties(&self, other: &ColumnDescriptor) -> Vec<ColumnProperty> {
        ColumnProperty::ALL
            .into_iter()
            .filter(|p| match p {
                ColumnProperty::Name => self.name != other.name,
                ColumnProperty::Type => self.data_type != other.data_type,
                ColumnProperty::TypeName => self.type_name != other.type_name,
                ColumnProperty::Precision => self.precision != other.precision,
                ColumnProperty::Scale => self.scale != other.scale,
                ColumnProperty::IsNullable => self.nullable != other.nullable,
                ColumnProperty::IsAutoIncrement => self.auto_increment != other.auto_increment,
                ColumnProperty::DefaultValue => self.default_text() != other.default_text(),
            })
            .collect()
    }
}
