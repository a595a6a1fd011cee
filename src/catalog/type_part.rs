//! Type clause rendering for `ALTER COLUMN ... TYPE`.
//!
//! Maps a proposed [`TypeSpec`] to the type text that follows `TYPE`, e.g. `VARCHAR(80)` or
//! `NUMERIC(10,2)`.

use super::descriptor::{data_type, TypeSpec};

/// Renders the type clause of a column definition
pub trait TypeRenderer: Send + Sync {
    fn render_type_part(&self, spec: &TypeSpec) -> String;
}

/// Renders `TypeName` with a length or precision/scale suffix where the type takes one
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTypeRenderer;

impl TypeRenderer for StandardTypeRenderer {
    fn render_type_part(&self, spec: &TypeSpec) -> String {
        let name = if spec.type_name.trim().is_empty() {
            canonical_type_name(spec.data_type).to_string()
        } else {
            spec.type_name.trim().to_string()
        };

        // Callers that already spelled out the parameters get them back untouched
        if name.contains('(') {
            return name;
        }

        match spec.data_type {
            data_type::NUMERIC | data_type::DECIMAL => match (spec.precision, spec.scale) {
                (0, _) => name,
                (p, 0) => format!("{name}({p})"),
                (p, s) => format!("{name}({p},{s})"),
            },
            data_type::CHAR | data_type::VARCHAR | data_type::BINARY | data_type::VARBINARY => {
                if spec.precision > 0 {
                    format!("{name}({})", spec.precision)
                } else {
                    name
                }
            }
            _ => name,
        }
    }
}

/// Canonical SQL name for a numeric type code
#[must_use]
pub fn canonical_type_name(code: i32) -> &'static str {
    match code {
        data_type::BIT | data_type::BOOLEAN => "BOOLEAN",
        data_type::TINYINT | data_type::SMALLINT => "SMALLINT",
        data_type::INTEGER => "INTEGER",
        data_type::BIGINT => "BIGINT",
        data_type::FLOAT | data_type::DOUBLE => "DOUBLE PRECISION",
        data_type::REAL => "REAL",
        data_type::NUMERIC => "NUMERIC",
        data_type::DECIMAL => "DECIMAL",
        data_type::CHAR => "CHAR",
        data_type::VARCHAR => "VARCHAR",
        data_type::LONGVARCHAR | data_type::CLOB => "TEXT",
        data_type::DATE => "DATE",
        data_type::TIME => "TIME",
        data_type::TIMESTAMP => "TIMESTAMP",
        data_type::BINARY | data_type::VARBINARY | data_type::BLOB => "BYTEA",
        _ => "TEXT",
    }
}
