//! Database sources via DuckDB
//!
//! DuckDB is the query engine for every supported database: PostgreSQL,
//! MySQL and SQLite are attached through DuckDB extensions, DuckDB files
//! natively. On top of the engine this module provides table and query
//! analysis, destination schema inspection, relationship detection, the
//! foreign-key load order and database source contracts.

mod contracts;
mod engine;
mod introspection;
mod load_order;
mod relationships;
mod type_mapping;
mod types;

pub use contracts::{
    generate_database_multi_source_contracts, generate_database_source_contract,
    DatabaseSourceRequest, MultiSourceReport, MultiSourceRequest, SkippedTable,
    DEFAULT_SAMPLE_SIZE,
};
pub use engine::{
    normalize_connection_string, qualified_name, quote_ident, quote_literal,
    sanitize_connection_string, value_field_type, value_to_string, DatabaseEngine, ATTACH_ALIAS,
};
pub use introspection::{
    analyze_database_query, analyze_database_table, extract_table_list, inspect_table_schema,
    DatabaseAnalysis, TableListing, SAMPLE_DATA_ROWS,
};
pub use load_order::{calculate_load_order, LoadOrder, UNRESOLVED_LEVEL};
pub use relationships::{
    detect_foreign_keys, list_database_tables, relationships_for, ForeignKeyRef, ReferencedBy,
    RelationType, TableRelationships, TableSummary,
};
pub use type_mapping::map_database_type;
pub use types::{ColumnInfo, DatabaseKind, DbSourceType, ForeignKey, Probe, QueryResult};

#[cfg(test)]
mod tests;
