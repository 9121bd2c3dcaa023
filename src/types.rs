//! Common types used throughout contract-gen
//!
//! This module contains the contract-level field type vocabulary shared by
//! the database and API analyzers, plus a few type aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One sampled row of raw cell values
pub type SampleRow = Vec<String>;

// ============================================================================
// Field Types (database / API sources)
// ============================================================================

/// Contract-level field type derived from a declared native type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Bigint,
    #[default]
    Text,
    Float,
    Double,
    Decimal,
    Boolean,
    Datetime,
    Date,
    Time,
    Json,
    Binary,
    Uuid,
    Array,
    Email,
    Url,
    Null,
}

impl FieldType {
    /// Get the type name as used in contracts
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Bigint => "bigint",
            FieldType::Text => "text",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Json => "json",
            FieldType::Binary => "binary",
            FieldType::Uuid => "uuid",
            FieldType::Array => "array",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Null => "null",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
