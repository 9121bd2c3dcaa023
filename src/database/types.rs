//! Database layer types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Database Kind
// ============================================================================

/// Supported database systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[serde(rename = "postgresql", alias = "postgres")]
    Postgres,
    Mysql,
    Sqlite,
    Duckdb,
}

impl DatabaseKind {
    /// Name used in contracts and metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgresql",
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Duckdb => "duckdb",
        }
    }

    /// Schema assumed when the caller does not name one
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            DatabaseKind::Postgres => Some("public"),
            DatabaseKind::Sqlite | DatabaseKind::Duckdb => Some("main"),
            DatabaseKind::Mysql => None,
        }
    }

    /// Caller schema, or this kind's default
    pub fn resolve_schema(&self, schema: Option<&str>) -> Option<String> {
        schema
            .or_else(|| self.default_schema())
            .map(ToString::to_string)
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseKind::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseKind::Mysql),
            "sqlite" | "sqlite3" => Ok(DatabaseKind::Sqlite),
            "duckdb" => Ok(DatabaseKind::Duckdb),
            _ => Err(Error::UnsupportedDatabase(s.to_string())),
        }
    }
}

// ============================================================================
// Source Type
// ============================================================================

/// What a database source contract describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbSourceType {
    #[default]
    Table,
    View,
    Query,
}

impl DbSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbSourceType::Table => "table",
            DbSourceType::View => "view",
            DbSourceType::Query => "query",
        }
    }
}

impl fmt::Display for DbSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbSourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(DbSourceType::Table),
            "view" => Ok(DbSourceType::View),
            "query" => Ok(DbSourceType::Query),
            other => Err(Error::validation(format!(
                "Invalid source_type: {other}. Must be 'table', 'view', or 'query'"
            ))),
        }
    }
}

// ============================================================================
// Best-effort probes
// ============================================================================

/// Outcome of an introspection probe that some backends cannot answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The backend answered
    Known(T),
    /// The backend could not answer; callers fall back to a default
    Unsupported { reason: String },
}

impl<T> Probe<T> {
    /// Build a probe outcome from a fallible lookup
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Probe::Known(value),
            Err(e) => Probe::Unsupported {
                reason: e.to_string(),
            },
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Probe::Known(_))
    }

    /// The answer, if there was one
    pub fn known(self) -> Option<T> {
        match self {
            Probe::Known(value) => Some(value),
            Probe::Unsupported { .. } => None,
        }
    }

    /// The answer, or `fallback` when unsupported
    pub fn unwrap_or(self, fallback: T) -> T {
        self.known().unwrap_or(fallback)
    }
}

impl<T: Default> Probe<T> {
    /// The answer, or `T::default()` when unsupported
    pub fn unwrap_or_default(self) -> T {
        self.known().unwrap_or_default()
    }
}

// ============================================================================
// Catalog Rows
// ============================================================================

/// One column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Native type name
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

/// A foreign key declared on `table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub constraint_name: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

/// Result set of an ad-hoc query
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<duckdb::types::Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every cell rendered as text, NULL as an empty string
    pub fn to_strings(&self, limit: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| row.iter().map(super::engine::value_to_string).collect())
            .collect()
    }
}
