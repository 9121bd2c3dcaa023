//! Table, query and destination schema introspection

use super::engine::{value_field_type, DatabaseEngine};
use super::type_mapping::map_database_type;
use super::types::ColumnInfo;
use crate::contract::{DestinationSchema, QualityMetrics, SourceSchema};
use crate::error::{Error, Result};
use crate::types::{FieldType, JsonObject, JsonValue};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Rows copied into `quality_metrics.sample_data`
pub const SAMPLE_DATA_ROWS: usize = 10;

/// Nullable columns named in the quality issue before truncating
const NULLABLE_ISSUE_LIMIT: usize = 5;

/// Schema, quality metrics and metadata of one table or query
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseAnalysis {
    pub schema: SourceSchema,
    pub quality_metrics: QualityMetrics,
    pub metadata: JsonObject,
}

/// Analyze a table (or view): column types from the catalog, row count,
/// a bounded sample and the nullable-column issue.
pub fn analyze_database_table(
    engine: &DatabaseEngine,
    table: &str,
    schema: Option<&str>,
    sample_size: usize,
) -> Result<DatabaseAnalysis> {
    let kind = engine.kind();
    let schema = kind.resolve_schema(schema);
    let schema_ref = schema.as_deref();

    if !engine.relation_exists(schema_ref, table)? {
        return Err(Error::TableNotFound {
            table: table.to_string(),
            schema: schema.unwrap_or_else(|| "None".to_string()),
        });
    }

    let columns = engine.columns(schema_ref, table)?;
    let fields: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let data_types: Vec<String> = columns
        .iter()
        .map(|c| map_database_type(&c.data_type, kind).to_string())
        .collect();

    let primary_keys = engine.primary_key(schema_ref, table).unwrap_or_default();
    let total_rows = engine.count_rows(schema_ref, table)?;
    let sample = engine.sample_table(schema_ref, table, sample_size)?;

    let mut issues = Vec::new();
    if total_rows == 0 {
        issues.push("Table is empty".to_string());
    }
    let nullable_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.nullable)
        .map(|c| c.name.clone())
        .collect();
    if !nullable_columns.is_empty() {
        let shown: Vec<&str> = nullable_columns
            .iter()
            .take(NULLABLE_ISSUE_LIMIT)
            .map(String::as_str)
            .collect();
        issues.push(format!("Nullable columns: {}", shown.join(", ")));
    }

    debug!(
        table,
        columns = fields.len(),
        total_rows,
        sampled = sample.rows.len(),
        "Analyzed table"
    );

    let mut metadata = JsonObject::new();
    metadata.insert("database_type".into(), json!(kind.as_str()));
    metadata.insert("table_name".into(), json!(table));
    metadata.insert("schema".into(), json!(schema));
    metadata.insert("primary_keys".into(), json!(primary_keys));
    metadata.insert("column_count".into(), json!(fields.len()));
    metadata.insert("nullable_columns".into(), json!(nullable_columns));
    metadata.insert("sample_size".into(), json!(sample.rows.len()));
    metadata.insert("columns".into(), to_json(&columns)?);

    Ok(DatabaseAnalysis {
        schema: SourceSchema { fields, data_types },
        quality_metrics: QualityMetrics {
            total_rows,
            sample_data: sample.to_strings(SAMPLE_DATA_ROWS),
            issues,
        },
        metadata,
    })
}

/// Analyze the result set of an arbitrary query.
///
/// Column types come from the first non-NULL sampled value in each column.
/// The total count is a best-effort second query and falls back to the
/// number of sampled rows.
pub fn analyze_database_query(
    engine: &DatabaseEngine,
    query: &str,
    sample_size: usize,
) -> Result<DatabaseAnalysis> {
    let query = query.trim().trim_end_matches(';').trim_end();
    let sample = engine.query(&format!(
        "SELECT * FROM ({query}) AS subquery LIMIT {sample_size}"
    ))?;

    if sample.is_empty() {
        return Err(Error::EmptyQueryResult);
    }

    let data_types: Vec<String> = (0..sample.columns.len())
        .map(|idx| {
            sample
                .rows
                .iter()
                .find_map(|row| row.get(idx).and_then(value_field_type))
                .unwrap_or(FieldType::Text)
                .to_string()
        })
        .collect();

    let sampled = sample.rows.len() as u64;
    let count_sql = format!("SELECT COUNT(*) FROM ({query}) AS subquery");
    let total_rows = match engine.query_count(&count_sql) {
        Ok(0) => sampled,
        Ok(count) => count,
        Err(e) => {
            debug!("Row count for query unavailable, using sample size: {e}");
            sampled
        }
    };

    let mut metadata = JsonObject::new();
    metadata.insert("database_type".into(), json!(engine.kind().as_str()));
    metadata.insert("query".into(), json!(query));
    metadata.insert("column_count".into(), json!(sample.columns.len()));
    metadata.insert("sample_size".into(), json!(sample.rows.len()));

    Ok(DatabaseAnalysis {
        quality_metrics: QualityMetrics {
            total_rows,
            sample_data: sample.to_strings(SAMPLE_DATA_ROWS),
            issues: Vec::new(),
        },
        schema: SourceSchema {
            fields: sample.columns,
            data_types,
        },
        metadata,
    })
}

/// Describe an existing table as a destination schema.
///
/// `types` carries native type names; constraints per field are
/// `NOT NULL` and/or `PRIMARY KEY`.
pub fn inspect_table_schema(
    engine: &DatabaseEngine,
    table: &str,
    schema: Option<&str>,
) -> Result<DestinationSchema> {
    let schema = engine.kind().resolve_schema(schema);
    let schema_ref = schema.as_deref();

    if !engine.relation_exists(schema_ref, table)? {
        return Err(Error::TableNotFound {
            table: table.to_string(),
            schema: schema.unwrap_or_else(|| "None".to_string()),
        });
    }

    let columns = engine.columns(schema_ref, table)?;
    let primary_keys = engine.primary_key(schema_ref, table).unwrap_or_default();

    let mut result = DestinationSchema::default();
    for column in columns {
        let mut constraints = Vec::new();
        if !column.nullable {
            constraints.push("NOT NULL");
        }
        if primary_keys.contains(&column.name) {
            constraints.push("PRIMARY KEY");
        }
        if !constraints.is_empty() {
            result.constraints.insert(column.name.clone(), json!(constraints));
        }
        result.fields.push(column.name);
        result.types.push(column.data_type);
    }

    Ok(result)
}

/// One entry of a table listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableListing {
    pub name: String,
    pub column_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// List base tables, optionally with their columns.
///
/// A table whose columns cannot be read is still listed with a zero
/// column count (and an `error` when fields were requested).
pub fn extract_table_list(
    engine: &DatabaseEngine,
    schema: Option<&str>,
    with_fields: bool,
) -> Result<Vec<TableListing>> {
    let schema = engine.kind().resolve_schema(schema);
    let schema_ref = schema.as_deref();

    let listings = engine
        .list_tables(schema_ref)?
        .into_iter()
        .map(|name| match engine.columns(schema_ref, &name) {
            Ok(columns) => TableListing {
                name,
                column_count: columns.len(),
                columns: with_fields.then_some(columns),
                error: None,
            },
            Err(e) => {
                debug!(table = %name, "Failed to inspect columns: {e}");
                TableListing {
                    name,
                    column_count: 0,
                    columns: None,
                    error: with_fields.then(|| "Failed to inspect columns".to_string()),
                }
            }
        })
        .collect();

    Ok(listings)
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue> {
    Ok(serde_json::to_value(value)?)
}
