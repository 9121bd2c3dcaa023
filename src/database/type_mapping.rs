//! Native column type to contract type mapping

use super::types::DatabaseKind;
use crate::types::FieldType;

const INTEGER_MARKERS: &[&str] = &["int", "integer", "smallint", "tinyint", "mediumint"];
const TEXT_MARKERS: &[&str] = &["char", "varchar", "text", "clob", "string"];
const FLOAT_MARKERS: &[&str] = &["float", "real", "double"];
const DECIMAL_MARKERS: &[&str] = &["decimal", "numeric", "money"];
const BOOLEAN_MARKERS: &[&str] = &["bool", "boolean", "bit"];
const BINARY_MARKERS: &[&str] = &["blob", "binary", "bytea", "image"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Map a native column type name to a contract field type.
///
/// Matching is by lowercase substring and the first matching rule wins, so
/// `BIGINT` is caught by the integer rule before anything else sees it.
/// Unknown types fall back to text.
pub fn map_database_type(native: &str, kind: DatabaseKind) -> FieldType {
    let lower = native.to_lowercase();

    // DuckDB reports list columns of attached databases as `TYPE[]`
    if matches!(kind, DatabaseKind::Postgres | DatabaseKind::Duckdb)
        && (lower.contains("array") || lower.contains("[]"))
    {
        return FieldType::Array;
    }

    if contains_any(&lower, INTEGER_MARKERS) {
        return if lower.contains("big") {
            FieldType::Bigint
        } else {
            FieldType::Integer
        };
    }
    if contains_any(&lower, TEXT_MARKERS) {
        return FieldType::Text;
    }
    if contains_any(&lower, FLOAT_MARKERS) {
        return FieldType::Float;
    }
    if contains_any(&lower, DECIMAL_MARKERS) {
        return FieldType::Decimal;
    }
    if contains_any(&lower, BOOLEAN_MARKERS) {
        return FieldType::Boolean;
    }
    if lower.contains("timestamp") || lower.contains("datetime") {
        return FieldType::Datetime;
    }
    if lower.contains("date") {
        return FieldType::Date;
    }
    if lower.contains("time") {
        return FieldType::Time;
    }
    if lower.contains("json") {
        return FieldType::Json;
    }
    if contains_any(&lower, BINARY_MARKERS) {
        return FieldType::Binary;
    }
    if lower.contains("uuid") {
        return FieldType::Uuid;
    }

    FieldType::Text
}
