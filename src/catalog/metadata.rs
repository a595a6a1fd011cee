//! Catalog metadata readers.
//!
//! `MetadataSource` is what the columns/keys/indexes collections reload themselves from.
//! `PgMetadataSource` reads `information_schema` and `pg_indexes` over a `CatalogExecutor`.

use super::collections::{IndexDescriptor, KeyDescriptor, KeyType};
use super::descriptor::{data_type, ColumnDescriptor, Nullability};
use crate::error::CatalogError;
use crate::executor::CatalogExecutor;
use may_postgres::Row;
use sea_query::{Expr, ExprTrait, IntoIden, Order, PostgresQueryBuilder, Query, SchemaName, TableName};
use std::sync::Arc;

/// Reads table metadata from the catalog
pub trait MetadataSource: Send + Sync {
    fn load_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, CatalogError>;
    fn load_keys(&self, table: &str) -> Result<Vec<KeyDescriptor>, CatalogError>;
    fn load_indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>, CatalogError>;
}

/// `MetadataSource` backed by the PostgreSQL catalog of the current schema
pub struct PgMetadataSource {
    executor: Arc<dyn CatalogExecutor>,
}

impl PgMetadataSource {
    pub fn new(executor: Arc<dyn CatalogExecutor>) -> Self {
        Self { executor }
    }

    fn query(&self, sql: &str) -> Result<Vec<Row>, CatalogError> {
        log::trace!("catalog query: {sql}");
        Ok(self.executor.query_all(sql, &[])?)
    }
}

impl MetadataSource for PgMetadataSource {
    fn load_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        self.query(&columns_query(table))?
            .iter()
            .map(|row| {
                Ok(column_from_parts(ColumnParts {
                    name: get(row, "column_name")?,
                    pg_type: get(row, "data_type")?,
                    udt_name: get(row, "udt_name")?,
                    character_length: get(row, "character_maximum_length")?,
                    numeric_precision: get(row, "numeric_precision")?,
                    numeric_scale: get(row, "numeric_scale")?,
                    is_nullable: get(row, "is_nullable")?,
                    is_identity: get(row, "is_identity")?,
                    default_value: get(row, "column_default")?,
                }))
            })
            .collect()
    }

    fn load_keys(&self, table: &str) -> Result<Vec<KeyDescriptor>, CatalogError> {
        self.query(&keys_query(table))?
            .iter()
            .map(|row| {
                let name: String = get(row, "constraint_name")?;
                let constraint_type: String = get(row, "constraint_type")?;
                let key_type = key_type_from_constraint(&constraint_type).ok_or_else(|| {
                    CatalogError::Metadata(format!("unexpected constraint type {constraint_type}"))
                })?;
                Ok(KeyDescriptor { name, key_type })
            })
            .collect()
    }

    fn load_indexes(&self, table: &str) -> Result<Vec<IndexDescriptor>, CatalogError> {
        self.query(&indexes_query(table))?
            .iter()
            .map(|row| {
                let name: String = get(row, "indexname")?;
                let definition: String = get(row, "indexdef")?;
                Ok(IndexDescriptor {
                    name,
                    unique: definition.starts_with("CREATE UNIQUE"),
                    definition,
                })
            })
            .collect()
    }
}

fn get<T>(row: &Row, column: &str) -> Result<T, CatalogError>
where
    T: for<'a> may_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|e| CatalogError::Metadata(format!("failed to read column {column}: {e}")))
}

fn catalog_table(schema: &'static str, table: &'static str) -> TableName {
    TableName(Some(SchemaName::from(schema)), table.into_iden())
}

/// SELECT over `information_schema.columns` for one table of the current schema
///
/// Domain-typed catalog columns are cast to plain text/int4 so they decode as `String`/`i32`.
pub fn columns_query(table: &str) -> String {
    Query::select()
        .expr_as(Expr::cust("column_name::text"), "column_name")
        .expr_as(Expr::cust("data_type::text"), "data_type")
        .expr_as(Expr::cust("udt_name::text"), "udt_name")
        .expr_as(
            Expr::cust("character_maximum_length::int4"),
            "character_maximum_length",
        )
        .expr_as(Expr::cust("numeric_precision::int4"), "numeric_precision")
        .expr_as(Expr::cust("numeric_scale::int4"), "numeric_scale")
        .expr_as(Expr::cust("is_nullable::text"), "is_nullable")
        .expr_as(Expr::cust("is_identity::text"), "is_identity")
        .expr_as(Expr::cust("column_default::text"), "column_default")
        .from(catalog_table("information_schema", "columns"))
        .and_where(Expr::col("table_schema").eq(Expr::cust("current_schema()")))
        .and_where(Expr::col("table_name").eq(table.to_owned()))
        .order_by("ordinal_position", Order::Asc)
        .to_owned()
        .to_string(PostgresQueryBuilder)
}

/// SELECT over `information_schema.table_constraints` (primary, foreign and unique keys)
pub fn keys_query(table: &str) -> String {
    Query::select()
        .expr_as(Expr::cust("constraint_name::text"), "constraint_name")
        .expr_as(Expr::cust("constraint_type::text"), "constraint_type")
        .from(catalog_table("information_schema", "table_constraints"))
        .and_where(Expr::col("table_schema").eq(Expr::cust("current_schema()")))
        .and_where(Expr::col("table_name").eq(table.to_owned()))
        .and_where(Expr::col("constraint_type").is_in(["PRIMARY KEY", "FOREIGN KEY", "UNIQUE"]))
        .order_by("constraint_name", Order::Asc)
        .to_owned()
        .to_string(PostgresQueryBuilder)
}

/// SELECT over `pg_indexes`
pub fn indexes_query(table: &str) -> String {
    Query::select()
        .expr_as(Expr::cust("indexname::text"), "indexname")
        .expr_as(Expr::cust("indexdef::text"), "indexdef")
        .from("pg_indexes")
        .and_where(Expr::col("schemaname").eq(Expr::cust("current_schema()")))
        .and_where(Expr::col("tablename").eq(table.to_owned()))
        .order_by("indexname", Order::Asc)
        .to_owned()
        .to_string(PostgresQueryBuilder)
}

/// Raw values of one `information_schema.columns` row
#[derive(Debug, Clone)]
pub struct ColumnParts {
    pub name: String,
    pub pg_type: String,
    /// Underlying type name, e.g. `uuid`, `timestamptz` or `_int4`
    pub udt_name: String,
    pub character_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: String,
    pub is_identity: Option<String>,
    pub default_value: Option<String>,
}

/// Turn a catalog row into a descriptor
///
/// Identity columns and `nextval(...)` defaults are reported as autoincrement; a sequence
/// default is not a user default and is dropped from the descriptor.
///
/// Precision is the declared length of character types or the precision of `numeric`. The
/// bit width the catalog reports for integer and float types is not part of the type clause
/// and is left at 0, as is the scale of anything but `numeric`.
#[must_use]
pub fn column_from_parts(parts: ColumnParts) -> ColumnDescriptor {
    let (code, type_name) = pg_type_code(&parts.pg_type, &parts.udt_name);
    let numeric = code == data_type::NUMERIC;
    let precision = parts
        .character_length
        .or(if numeric { parts.numeric_precision } else { None })
        .unwrap_or(0);
    let scale = if numeric { parts.numeric_scale.unwrap_or(0) } else { 0 };
    let sequence_default = parts
        .default_value
        .as_deref()
        .is_some_and(|d| d.starts_with("nextval("));
    let identity = parts.is_identity.as_deref() == Some("YES");

    let nullable = match parts.is_nullable.as_str() {
        "YES" => Nullability::Nullable,
        "NO" => Nullability::NoNulls,
        _ => Nullability::Unknown,
    };

    ColumnDescriptor {
        name: parts.name,
        data_type: code,
        type_name,
        precision,
        scale,
        nullable,
        auto_increment: identity || sequence_default,
        default_value: if sequence_default { None } else { parts.default_value },
    }
}

/// Map an `information_schema` data type to a type code and the name used in `TYPE` clauses
///
/// Types without an engine-neutral code keep their own name (`udt_name`), so a column is
/// never silently re-typed to something else. Zoned time types keep their zoned name.
#[must_use]
pub fn pg_type_code(pg_type: &str, udt_name: &str) -> (i32, String) {
    let (code, name) = match pg_type {
        "smallint" => (data_type::SMALLINT, "SMALLINT"),
        "integer" => (data_type::INTEGER, "INTEGER"),
        "bigint" => (data_type::BIGINT, "BIGINT"),
        "real" => (data_type::REAL, "REAL"),
        "double precision" => (data_type::DOUBLE, "DOUBLE PRECISION"),
        "numeric" => (data_type::NUMERIC, "NUMERIC"),
        "character" => (data_type::CHAR, "CHAR"),
        "character varying" => (data_type::VARCHAR, "VARCHAR"),
        "text" => (data_type::LONGVARCHAR, "TEXT"),
        "boolean" => (data_type::BOOLEAN, "BOOLEAN"),
        "date" => (data_type::DATE, "DATE"),
        "time without time zone" => (data_type::TIME, "TIME"),
        "time with time zone" => (data_type::TIME, "TIMETZ"),
        "timestamp without time zone" => (data_type::TIMESTAMP, "TIMESTAMP"),
        "timestamp with time zone" => (data_type::TIMESTAMP, "TIMESTAMPTZ"),
        "bytea" => (data_type::VARBINARY, "BYTEA"),
        _ => {
            let name = if udt_name.is_empty() { pg_type } else { udt_name };
            return (data_type::OTHER, name.to_string());
        }
    };
    (code, name.to_string())
}

fn key_type_from_constraint(constraint_type: &str) -> Option<KeyType> {
    match constraint_type {
        "PRIMARY KEY" => Some(KeyType::Primary),
        "FOREIGN KEY" => Some(KeyType::Foreign),
        "UNIQUE" => Some(KeyType::Unique),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::diff::{compute_changes, ChangeOp};
    use crate::catalog::type_part::{StandardTypeRenderer, TypeRenderer};

    fn parts(pg_type: &str) -> ColumnParts {
        ColumnParts {
            name: "id".into(),
            pg_type: pg_type.into(),
            udt_name: String::new(),
            character_length: None,
            numeric_precision: Some(32),
            numeric_scale: Some(0),
            is_nullable: "NO".into(),
            is_identity: Some("NO".into()),
            default_value: None,
        }
    }

    #[test]
    fn test_columns_query_filters_table() {
        let sql = columns_query("orders");
        assert!(sql.contains("\"information_schema\".\"columns\""));
        assert!(sql.contains("'orders'"));
        assert!(sql.contains("ORDER BY \"ordinal_position\" ASC"));
    }

    #[test]
    fn test_table_name_is_escaped_as_literal() {
        let sql = keys_query("o'brien");
        assert!(sql.contains("'o''brien'") || sql.contains("E'o\\'brien'"));
        assert!(sql.contains("'PRIMARY KEY'"));
    }

    #[test]
    fn test_indexes_query() {
        let sql = indexes_query("orders");
        assert!(sql.contains("\"pg_indexes\""));
        assert!(sql.contains("'orders'"));
    }

    #[test]
    fn test_column_mapping() {
        let d = column_from_parts(parts("integer"));
        assert_eq!(d.data_type, data_type::INTEGER);
        assert_eq!(d.type_name, "INTEGER");
        assert_eq!(d.nullable, Nullability::NoNulls);
        assert!(!d.auto_increment);

        let mut p = parts("character varying");
        p.is_nullable = "YES".into();
        p.character_length = Some(80);
        p.numeric_precision = None;
        p.default_value = Some("'n/a'::character varying".into());
        let d = column_from_parts(p);
        assert_eq!((d.data_type, d.precision), (data_type::VARCHAR, 80));
        assert_eq!(d.nullable, Nullability::Nullable);
        assert_eq!(d.default_text(), Some("'n/a'::character varying"));
    }

    #[test]
    fn test_serial_and_identity_columns_are_autoincrement() {
        let mut p = parts("integer");
        p.default_value = Some("nextval('t_id_seq'::regclass)".into());
        let d = column_from_parts(p);
        assert!(d.auto_increment);
        assert!(!d.has_default());

        let mut p = parts("bigint");
        p.is_identity = Some("YES".into());
        assert!(column_from_parts(p).auto_increment);
    }

    #[test]
    fn test_integer_bit_width_is_not_precision() {
        let d = column_from_parts(parts("integer"));
        assert_eq!((d.precision, d.scale), (0, 0));
        // a hand-built descriptor of the same column shows no type difference
        let built = ColumnDescriptor::new("id", data_type::INTEGER, "INTEGER")
            .with_nullability(Nullability::NoNulls);
        assert!(compute_changes(&d, &built).is_empty());

        let mut p = parts("numeric");
        p.numeric_precision = Some(12);
        p.numeric_scale = Some(2);
        let d = column_from_parts(p);
        assert_eq!((d.precision, d.scale), (12, 2));
    }

    #[test]
    fn test_zoned_timestamp_keeps_its_name() {
        let mut p = parts("timestamp with time zone");
        p.udt_name = "timestamptz".into();
        p.numeric_precision = None;
        let d = column_from_parts(p);
        assert_eq!((d.data_type, d.type_name.as_str()), (data_type::TIMESTAMP, "TIMESTAMPTZ"));

        let proposed = d.clone().with_type(data_type::TIMESTAMP, "TIMESTAMP");
        let changes = compute_changes(&d, &proposed);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], ChangeOp::TypeChange(ref spec) if spec.type_name == "TIMESTAMP"));
        assert!(compute_changes(&d, &d.clone()).is_empty());
    }

    #[test]
    fn test_unmapped_types_keep_their_udt_name() {
        let mut p = parts("uuid");
        p.udt_name = "uuid".into();
        p.numeric_precision = None;
        let d = column_from_parts(p);
        assert_eq!((d.data_type, d.type_name.as_str()), (data_type::OTHER, "uuid"));

        // a type change on the column renders its own type, not TEXT
        let rendered = StandardTypeRenderer.render_type_part(&d.clone().with_precision(5).type_spec());
        assert_eq!(rendered, "uuid");

        assert_eq!(pg_type_code("USER-DEFINED", "mood"), (data_type::OTHER, "mood".to_string()));
        assert_eq!(pg_type_code("jsonb", ""), (data_type::OTHER, "jsonb".to_string()));
    }

    #[test]
    fn test_unrecognized_constraints() {
        assert_eq!(key_type_from_constraint("CHECK"), None);
        assert_eq!(key_type_from_constraint("UNIQUE"), Some(KeyType::Unique));
    }
}
