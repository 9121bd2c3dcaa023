//! DuckDB-based database introspection engine
//!
//! Provides unified read-only access to PostgreSQL, MySQL, SQLite and DuckDB
//! files. The target database is attached to an in-memory DuckDB connection
//! as `source_db` and inspected through DuckDB's catalog functions.

use super::types::{ColumnInfo, DatabaseKind, ForeignKey, Probe, QueryResult};
use crate::error::{Error, Result};
use crate::types::FieldType;
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Alias under which the target database is attached
pub const ATTACH_ALIAS: &str = "source_db";

static PASSWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"://([^:/@]+):([^@/]+)@").expect("valid password pattern"));

/// Database introspection engine using DuckDB
pub struct DatabaseEngine {
    /// DuckDB connection
    conn: Connection,
    /// Database kind
    kind: DatabaseKind,
    /// Connection string as given (for logging, always sanitized)
    connection_string: String,
}

impl DatabaseEngine {
    /// Open an engine and attach the target database read-only
    pub fn connect(kind: DatabaseKind, connection_string: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;

        let target = normalize_connection_string(kind, connection_string)?;
        let engine = Self {
            conn,
            kind,
            connection_string: connection_string.to_string(),
        };
        engine.attach_database(&target)?;

        debug!(
            database = %kind,
            connection = %engine.connection_info(),
            "Attached source database"
        );
        Ok(engine)
    }

    /// Attach external database to DuckDB
    fn attach_database(&self, target: &str) -> Result<()> {
        let target = target.replace('\'', "''");
        let (extension, attach_sql) = match self.kind {
            DatabaseKind::Postgres => (
                Some("postgres"),
                format!("ATTACH '{target}' AS {ATTACH_ALIAS} (TYPE POSTGRES, READ_ONLY);"),
            ),
            DatabaseKind::Mysql => (
                Some("mysql"),
                format!("ATTACH '{target}' AS {ATTACH_ALIAS} (TYPE MYSQL, READ_ONLY);"),
            ),
            DatabaseKind::Sqlite => (
                Some("sqlite"),
                format!("ATTACH '{target}' AS {ATTACH_ALIAS} (TYPE SQLITE, READ_ONLY);"),
            ),
            DatabaseKind::Duckdb => (
                None,
                format!("ATTACH '{target}' AS {ATTACH_ALIAS} (READ_ONLY);"),
            ),
        };

        if let Some(extension) = extension {
            self.conn
                .execute_batch(&format!("INSTALL {extension}; LOAD {extension};"))
                .map_err(|e| {
                    Error::config(format!("Failed to load {extension} extension: {e}"))
                })?;
        }

        self.conn.execute_batch(&attach_sql).map_err(|e| {
            Error::config(format!("Failed to attach {} database: {e}", self.kind))
        })?;

        // Lets ad-hoc queries use unqualified table names
        if let Err(e) = self.conn.execute_batch(&format!("USE {ATTACH_ALIAS};")) {
            warn!("Could not make {ATTACH_ALIAS} the default catalog: {e}");
        }

        Ok(())
    }

    /// Get database kind
    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    /// Get connection string (for logging - password masked)
    pub fn connection_info(&self) -> String {
        sanitize_connection_string(&self.connection_string)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Base table names in `schema` (all schemas when `None`), sorted
    pub fn list_tables(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT table_name FROM duckdb_tables() WHERE {} ORDER BY table_name",
            catalog_filter(schema)
        );
        self.query_strings(&sql, &[])
    }

    /// View names in `schema` (all schemas when `None`), sorted
    pub fn list_views(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT view_name FROM duckdb_views() WHERE {} AND NOT internal ORDER BY view_name",
            catalog_filter(schema)
        );
        self.query_strings(&sql, &[])
    }

    /// Whether a table or view with this name exists
    pub fn relation_exists(&self, schema: Option<&str>, name: &str) -> Result<bool> {
        Ok(self.list_tables(schema)?.iter().any(|t| t == name)
            || self.list_views(schema)?.iter().any(|v| v == name))
    }

    /// Columns of a table or view, in declaration order
    pub fn columns(&self, schema: Option<&str>, table: &str) -> Result<Vec<ColumnInfo>> {
        let sql = format!(
            "SELECT column_name, data_type, is_nullable, column_default
             FROM duckdb_columns()
             WHERE {} AND table_name = ?
             ORDER BY column_index",
            catalog_filter(schema)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map(duckdb::params![table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    nullable: row.get::<_, Option<bool>>(2)?.unwrap_or(true),
                    default: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(columns)
    }

    /// Primary-key columns of a table
    pub fn primary_key(&self, schema: Option<&str>, table: &str) -> Probe<Vec<String>> {
        let sql = format!(
            "SELECT array_to_string(constraint_column_names, ',')
             FROM duckdb_constraints()
             WHERE {} AND table_name = ? AND constraint_type = 'PRIMARY KEY'",
            catalog_filter(schema)
        );

        let result = self
            .query_strings(&sql, &[table])
            .map(|rows| rows.first().map(|cols| split_list(cols)).unwrap_or_default());

        let probe = Probe::from_result(result);
        if let Probe::Unsupported { reason } = &probe {
            debug!(table, reason = %reason, "Primary key probe unsupported");
        }
        probe
    }

    /// Every foreign key declared in `schema`
    pub fn foreign_keys(&self, schema: Option<&str>) -> Probe<Vec<ForeignKey>> {
        let probe = Probe::from_result(self.load_foreign_keys(schema));
        if let Probe::Unsupported { reason } = &probe {
            debug!(reason = %reason, "Foreign key probe unsupported");
        }
        probe
    }

    fn load_foreign_keys(&self, schema: Option<&str>) -> Result<Vec<ForeignKey>> {
        let sql = format!(
            "SELECT table_name,
                    constraint_name,
                    array_to_string(constraint_column_names, ','),
                    referenced_table,
                    array_to_string(referenced_column_names, ',')
             FROM duckdb_constraints()
             WHERE {} AND constraint_type = 'FOREIGN KEY'
             ORDER BY table_name, constraint_index",
            catalog_filter(schema)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map([], |row| {
                Ok(ForeignKey {
                    table: row.get(0)?,
                    constraint_name: row.get(1)?,
                    columns: split_list(&row.get::<_, Option<String>>(2)?.unwrap_or_default()),
                    referred_table: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    referred_columns: split_list(
                        &row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    ),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(keys)
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Exact row count of a table
    pub fn count_rows(&self, schema: Option<&str>, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", qualified_name(schema, table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// First `limit` rows of a table
    pub fn sample_table(
        &self,
        schema: Option<&str>,
        table: &str,
        limit: usize,
    ) -> Result<QueryResult> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {limit}",
            qualified_name(schema, table)
        );
        self.query(&sql)
    }

    /// Run a query and materialize every row
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let columns = rows
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default();

        let mut result = QueryResult {
            columns,
            rows: Vec::new(),
        };
        while let Some(row) = rows.next()? {
            let values = (0..result.columns.len())
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            result.rows.push(values);
        }

        Ok(result)
    }

    /// Run a single-value `COUNT(*)` style query
    pub fn query_count(&self, sql: &str) -> Result<u64> {
        debug!("Executing count: {}", sql);
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn query_strings(&self, sql: &str, params: &[&str]) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = stmt
            .query_map(duckdb::params_from_iter(params.iter()), |row| {
                row.get::<_, Option<String>>(0)
            })?
            .filter_map(|value| value.transpose())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

// ============================================================================
// SQL helpers
// ============================================================================

/// Quote an identifier for DuckDB
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a string literal for DuckDB
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Fully qualified relation name inside the attached database
pub fn qualified_name(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!(
            "{ATTACH_ALIAS}.{}.{}",
            quote_ident(schema),
            quote_ident(table)
        ),
        None => format!("{ATTACH_ALIAS}.{}", quote_ident(table)),
    }
}

fn catalog_filter(schema: Option<&str>) -> String {
    let mut filter = format!("database_name = {}", quote_literal(ATTACH_ALIAS));
    if let Some(schema) = schema {
        filter.push_str(&format!(" AND schema_name = {}", quote_literal(schema)));
    }
    filter
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

// ============================================================================
// Connection strings
// ============================================================================

/// Replace the password of a URL-style connection string with `***`
pub fn sanitize_connection_string(connection_string: &str) -> String {
    if let Ok(parsed) = url::Url::parse(connection_string) {
        if let Some(password) = parsed.password().filter(|p| !p.is_empty()) {
            return connection_string.replace(password, "***");
        }
    }
    PASSWORD_PATTERN
        .replace(connection_string, "://$1:***@")
        .into_owned()
}

/// Convert SQLAlchemy-style URLs into what DuckDB's ATTACH expects
pub fn normalize_connection_string(kind: DatabaseKind, connection_string: &str) -> Result<String> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("connection_string must not be empty"));
    }

    match kind {
        DatabaseKind::Postgres => Ok(strip_driver(trimmed)),
        DatabaseKind::Mysql => {
            let url_form = strip_driver(trimmed);
            if !url_form.starts_with("mysql://") {
                // Already in key=value form
                return Ok(url_form);
            }
            let parsed = url::Url::parse(&url_form)
                .map_err(|e| Error::validation(format!("Invalid MySQL connection string: {e}")))?;

            let mut parts = Vec::new();
            if let Some(host) = parsed.host_str() {
                parts.push(format!("host={host}"));
            }
            if let Some(port) = parsed.port() {
                parts.push(format!("port={port}"));
            }
            if !parsed.username().is_empty() {
                parts.push(format!("user={}", parsed.username()));
            }
            if let Some(password) = parsed.password() {
                parts.push(format!("password={password}"));
            }
            let database = parsed.path().trim_start_matches('/');
            if !database.is_empty() {
                parts.push(format!("database={database}"));
            }
            Ok(parts.join(" "))
        }
        DatabaseKind::Sqlite | DatabaseKind::Duckdb => {
            let path = ["sqlite:///", "duckdb:///"]
                .iter()
                .find_map(|prefix| trimmed.strip_prefix(prefix))
                .unwrap_or(trimmed);
            Ok(path.to_string())
        }
    }
}

/// `postgresql+psycopg2://...` becomes `postgresql://...`
fn strip_driver(connection_string: &str) -> String {
    match connection_string.split_once("://") {
        Some((scheme, rest)) => {
            let scheme = scheme.split('+').next().unwrap_or(scheme);
            format!("{scheme}://{rest}")
        }
        None => connection_string.to_string(),
    }
}

// ============================================================================
// Value conversion
// ============================================================================

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Render a DuckDB value as a sample cell (NULL becomes an empty string)
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(i) => i.to_string(),
        Value::SmallInt(i) => i.to_string(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::HugeInt(i) => i.to_string(),
        Value::UTinyInt(i) => i.to_string(),
        Value::USmallInt(i) => i.to_string(),
        Value::UInt(i) => i.to_string(),
        Value::UBigInt(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(f) => f.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b),
        Value::Timestamp(unit, raw) => {
            let micros = to_micros(*unit, *raw);
            let secs = micros.div_euclid(1_000_000);
            let nsecs = (micros.rem_euclid(1_000_000) * 1000) as u32;
            chrono::DateTime::from_timestamp(secs, nsecs).map_or_else(
                || raw.to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            )
        }
        Value::Date32(days) => {
            // Days since epoch (719163 is the number of days from 1 CE to 1970-01-01)
            chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map_or_else(|| days.to_string(), |d| d.format("%Y-%m-%d").to_string())
        }
        Value::Time64(unit, raw) => {
            let micros = to_micros(*unit, *raw);
            let secs = micros / 1_000_000;
            format!(
                "{:02}:{:02}:{:02}.{:06}",
                secs / 3600,
                (secs % 3600) / 60,
                secs % 60,
                micros % 1_000_000
            )
        }
        other => format!("{other:?}"),
    }
}

/// Contract type implied by a runtime value, `None` for NULL
pub fn value_field_type(value: &Value) -> Option<FieldType> {
    match value {
        Value::Null => None,
        Value::Boolean(_) => Some(FieldType::Boolean),
        Value::TinyInt(_)
        | Value::SmallInt(_)
        | Value::Int(_)
        | Value::BigInt(_)
        | Value::HugeInt(_)
        | Value::UTinyInt(_)
        | Value::USmallInt(_)
        | Value::UInt(_)
        | Value::UBigInt(_) => Some(FieldType::Integer),
        Value::Float(_) | Value::Double(_) => Some(FieldType::Float),
        _ => Some(FieldType::Text),
    }
}
