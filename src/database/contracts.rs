//! Database source contracts, single and batched

use super::engine::DatabaseEngine;
use super::introspection::{analyze_database_query, analyze_database_table, DatabaseAnalysis};
use super::load_order::{calculate_load_order, LoadOrder};
use super::relationships::{list_database_tables, relationships_for, TableRelationships};
use super::types::{DatabaseKind, DbSourceType};
use crate::contract::{Contract, DatabaseLocation, SourceContract, SourceLocation};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Rows sampled per table when the caller does not say
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_source_type() -> String {
    DbSourceType::Table.to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Single Source
// ============================================================================

/// Parameters of a database source contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSourceRequest {
    pub source_id: String,
    pub connection_string: String,
    pub database_type: String,
    /// table, view or query
    #[serde(default = "default_source_type")]
    pub source_type: String,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Merged into the contract metadata
    #[serde(default)]
    pub config: Option<JsonObject>,
}

/// What a validated request points at
enum Target<'a> {
    Relation(DbSourceType, &'a str),
    Query(&'a str),
}

impl DatabaseSourceRequest {
    /// Check the parameter combination before anything connects
    fn target(&self) -> Result<Target<'_>> {
        let source_type: DbSourceType = self.source_type.parse()?;
        match source_type {
            DbSourceType::Table | DbSourceType::View => self
                .source_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| Target::Relation(source_type, name))
                .ok_or_else(|| {
                    Error::validation(format!(
                        "source_name is required when source_type is '{source_type}'"
                    ))
                }),
            DbSourceType::Query => self
                .query
                .as_deref()
                .filter(|q| !q.trim().is_empty())
                .map(Target::Query)
                .ok_or_else(|| Error::validation("query is required when source_type is 'query'")),
        }
    }
}

/// Generate a source contract for one table, view or query
pub fn generate_database_source_contract(
    request: &DatabaseSourceRequest,
) -> Result<SourceContract> {
    let target = request.target()?;
    let kind: DatabaseKind = request.database_type.parse()?;
    let engine = DatabaseEngine::connect(kind, &request.connection_string)?;

    let (source_type, source_name, analysis) = match target {
        Target::Relation(source_type, name) => (
            source_type,
            Some(name.to_string()),
            analyze_database_table(&engine, name, request.schema.as_deref(), request.sample_size)?,
        ),
        Target::Query(query) => (
            DbSourceType::Query,
            request.source_name.clone(),
            analyze_database_query(&engine, query, request.sample_size)?,
        ),
    };

    Ok(build_contract(
        &request.source_id,
        DatabaseLocation {
            database_type: kind,
            source_type,
            source_name,
            database_schema: request.schema.clone(),
        },
        analysis,
        request.config.as_ref(),
    ))
}

fn build_contract(
    source_id: &str,
    location: DatabaseLocation,
    analysis: DatabaseAnalysis,
    config: Option<&JsonObject>,
) -> SourceContract {
    let mut metadata = analysis.metadata;
    if let Some(config) = config {
        metadata.extend(config.clone());
    }

    SourceContract::new(
        source_id,
        SourceLocation::Database(location),
        analysis.schema,
        analysis.quality_metrics,
    )
    .with_metadata(metadata)
}

// ============================================================================
// Multiple Sources
// ============================================================================

/// Parameters of a multi-table run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSourceRequest {
    pub connection_string: String,
    pub database_type: String,
    #[serde(default)]
    pub schema: Option<String>,
    /// Every base table when `None`
    #[serde(default)]
    pub tables: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub include_relationships: bool,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default)]
    pub config: Option<JsonObject>,
}

/// A table left out of a multi-table run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// Outcome of a multi-table run
#[derive(Debug, Clone, Serialize)]
pub struct MultiSourceReport {
    /// Contracts in load order
    pub contracts: Vec<Contract>,
    pub count: usize,
    pub requested: usize,
    pub skipped: Vec<SkippedTable>,
}

/// Generate one source contract per table, ordered for loading.
///
/// With relationships enabled each contract's metadata gets
/// `relationships`, `load_order` and `depends_on`. A table that fails is
/// logged and reported in `skipped`; it never aborts the run.
pub fn generate_database_multi_source_contracts(
    request: &MultiSourceRequest,
) -> Result<MultiSourceReport> {
    let kind: DatabaseKind = request.database_type.parse()?;
    let engine = DatabaseEngine::connect(kind, &request.connection_string)?;
    let schema = request.schema.as_deref();

    let tables: Vec<String> = match &request.tables {
        Some(tables) => tables.clone(),
        None => list_database_tables(&engine, schema, false, false)?
            .into_iter()
            .map(|summary| summary.table_name)
            .collect(),
    };

    if tables.is_empty() {
        return Ok(MultiSourceReport {
            contracts: Vec::new(),
            count: 0,
            requested: 0,
            skipped: Vec::new(),
        });
    }

    let mut relationships: BTreeMap<String, TableRelationships> = BTreeMap::new();
    let mut dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let load_order = if request.include_relationships {
        let resolved = kind.resolve_schema(schema);
        let keys = engine.foreign_keys(resolved.as_deref()).known().unwrap_or_else(|| {
            warn!("Foreign keys unavailable, tables will load without dependencies");
            Vec::new()
        });

        for table in &tables {
            let rels = relationships_for(&keys, table, resolved.as_deref());
            let depends_on: Vec<String> = rels
                .referred_tables()
                .into_iter()
                .filter(|referred| referred != table && tables.contains(referred))
                .collect();
            dependencies.insert(table.clone(), depends_on);
            relationships.insert(table.clone(), rels);
        }

        let order = calculate_load_order(&dependencies);
        if !order.unresolved().is_empty() {
            warn!(tables = ?order.unresolved(), "Circular foreign-key dependencies");
        }
        order
    } else {
        let mut order: Vec<String> = tables.clone();
        order.sort();
        order.dedup();
        LoadOrder {
            levels: order.iter().map(|t| (t.clone(), 1)).collect(),
            order,
        }
    };

    let mut contracts = Vec::new();
    let mut skipped = Vec::new();

    for table in &load_order.order {
        let location = DatabaseLocation {
            database_type: kind,
            source_type: DbSourceType::Table,
            source_name: Some(table.clone()),
            database_schema: request.schema.clone(),
        };
        let result = analyze_database_table(&engine, table, schema, request.sample_size)
            .map(|analysis| build_contract(table, location, analysis, request.config.as_ref()));

        match result {
            Ok(mut contract) => {
                if let Some(rels) = relationships.get(table) {
                    contract
                        .metadata
                        .insert("relationships".into(), serde_json::to_value(rels)?);
                    contract
                        .metadata
                        .insert("load_order".into(), json!(load_order.level(table).unwrap_or(1)));
                    contract.metadata.insert(
                        "depends_on".into(),
                        json!(dependencies.get(table).cloned().unwrap_or_default()),
                    );
                }
                debug!(table = %table, "Generated source contract");
                contracts.push(Contract::from(contract));
            }
            Err(e) => {
                warn!(table = %table, "Skipping table: {e}");
                skipped.push(SkippedTable {
                    table: table.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        generated = contracts.len(),
        requested = load_order.order.len(),
        skipped = skipped.len(),
        "Multi-table contract generation finished"
    );

    Ok(MultiSourceReport {
        count: contracts.len(),
        requested: load_order.order.len(),
        contracts,
        skipped,
    })
}
