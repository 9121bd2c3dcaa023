//! Table listing and foreign-key relationship detection

use super::engine::DatabaseEngine;
use super::types::ForeignKey;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Relation kind in a table listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Table,
    View,
}

/// Metadata about one table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table_name: String,
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub has_primary_key: bool,
    #[serde(default)]
    pub primary_key_columns: Vec<String>,
    /// `None` when not requested, not a table, or the count failed
    pub row_count: Option<u64>,
    pub column_count: Option<usize>,
}

/// List tables (and optionally views) with per-table metadata, sorted by name
pub fn list_database_tables(
    engine: &DatabaseEngine,
    schema: Option<&str>,
    include_views: bool,
    include_row_counts: bool,
) -> Result<Vec<TableSummary>> {
    let schema = engine.kind().resolve_schema(schema);
    let schema_ref = schema.as_deref();

    let mut relations: Vec<(String, RelationType)> = engine
        .list_tables(schema_ref)?
        .into_iter()
        .map(|name| (name, RelationType::Table))
        .collect();
    if include_views {
        relations.extend(
            engine
                .list_views(schema_ref)?
                .into_iter()
                .map(|name| (name, RelationType::View)),
        );
    }

    let mut summaries: Vec<TableSummary> = relations
        .into_iter()
        .map(|(name, relation_type)| {
            let primary_key_columns = engine.primary_key(schema_ref, &name).unwrap_or_default();

            let row_count = if include_row_counts && relation_type == RelationType::Table {
                engine
                    .count_rows(schema_ref, &name)
                    .inspect_err(|e| debug!(table = %name, "Could not count rows: {e}"))
                    .ok()
            } else {
                None
            };

            let column_count = engine
                .columns(schema_ref, &name)
                .inspect_err(|e| debug!(table = %name, "Could not read columns: {e}"))
                .ok()
                .map(|columns| columns.len());

            TableSummary {
                schema: schema.clone(),
                relation_type,
                has_primary_key: !primary_key_columns.is_empty(),
                primary_key_columns,
                row_count,
                column_count,
                table_name: name,
            }
        })
        .collect();

    summaries.sort_by(|a, b| a.table_name.cmp(&b.table_name));
    Ok(summaries)
}

/// A foreign key declared on the inspected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub constraint_name: Option<String>,
    pub columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
    pub referred_schema: Option<String>,
}

/// A foreign key on another table pointing at the inspected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedBy {
    pub constraint_name: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub referred_columns: Vec<String>,
}

/// Both directions of a table's foreign-key relationships
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableRelationships {
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub referenced_by: Vec<ReferencedBy>,
}

impl TableRelationships {
    /// Tables this one depends on, deduplicated, in declaration order
    pub fn referred_tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();
        for fk in &self.foreign_keys {
            if !tables.contains(&fk.referred_table) {
                tables.push(fk.referred_table.clone());
            }
        }
        tables
    }
}

/// Detect outgoing and incoming foreign keys of `table`.
///
/// An unsupported or failing probe yields empty lists.
pub fn detect_foreign_keys(
    engine: &DatabaseEngine,
    table: &str,
    schema: Option<&str>,
) -> TableRelationships {
    let schema = engine.kind().resolve_schema(schema);
    match engine.foreign_keys(schema.as_deref()).known() {
        Some(keys) => relationships_for(&keys, table, schema.as_deref()),
        None => {
            warn!(table, "Could not inspect foreign keys");
            TableRelationships::default()
        }
    }
}

/// Split catalog-wide foreign keys into the two directions seen from `table`
pub fn relationships_for(
    keys: &[ForeignKey],
    table: &str,
    schema: Option<&str>,
) -> TableRelationships {
    let foreign_keys = keys
        .iter()
        .filter(|fk| fk.table == table)
        .map(|fk| ForeignKeyRef {
            constraint_name: fk.constraint_name.clone(),
            columns: fk.columns.clone(),
            referred_table: fk.referred_table.clone(),
            referred_columns: fk.referred_columns.clone(),
            referred_schema: schema.map(ToString::to_string),
        })
        .collect();

    let referenced_by = keys
        .iter()
        .filter(|fk| fk.referred_table == table && fk.table != table)
        .map(|fk| ReferencedBy {
            constraint_name: fk.constraint_name.clone(),
            table: fk.table.clone(),
            columns: fk.columns.clone(),
            referred_columns: fk.referred_columns.clone(),
        })
        .collect();

    TableRelationships {
        foreign_keys,
        referenced_by,
    }
}
