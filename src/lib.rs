//! # contract-gen
//!
//! Infers data contracts from real data: CSV and JSON files, database tables
//! and queries, and OpenAPI request bodies.
//!
//! ## Features
//!
//! - **File analysis**: encoding and delimiter detection, header and BOM
//!   handling, per-column type inference over sparse, mixed-locale data
//! - **Database analysis**: PostgreSQL, MySQL, SQLite and DuckDB through a
//!   single DuckDB engine, with foreign-key relationships and load order
//! - **API destinations**: request-body schemas from OpenAPI/Swagger documents
//! - **Contracts**: source, destination and transformation documents in JSON
//!   or YAML, plus validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_gen::contract::{generate_source_contract, Contract};
//! use contract_gen::sources::AnalyzeOptions;
//!
//! fn main() -> contract_gen::Result<()> {
//!     let contract = generate_source_contract(
//!         "data/transactions.csv",
//!         "transactions",
//!         &AnalyzeOptions::new(),
//!         None,
//!     )?;
//!     println!("{}", serde_json::to_string_pretty(&Contract::from(contract))?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │              CLI (clap)        Tool server (axum)            │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                    Contract assembler                        │
//! └──────────┬────────────────────┬────────────────────┬─────────┘
//!            │                    │                    │
//! ┌──────────┴─────────┐ ┌────────┴─────────┐ ┌────────┴─────────┐
//! │ Sources (CSV/JSON) │ │ Database (DuckDB)│ │ OpenAPI          │
//! │ decode: encoding,  │ │ tables, queries, │ │ request bodies,  │
//! │ delimiter          │ │ FKs, load order  │ │ $ref resolution  │
//! └──────────┬─────────┘ └────────┬─────────┘ └──────────────────┘
//!            └─────────┬──────────┘
//!            ┌─────────┴──────────┐
//!            │ Schema: classifier │
//!            │ and reconciler     │
//!            └────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Value classification and column type reconciliation
pub mod schema;

/// Encoding and delimiter detection
pub mod decode;

/// CSV and JSON file analyzers
pub mod sources;

/// Database sources via DuckDB
pub mod database;

/// OpenAPI destinations
pub mod openapi;

/// Contract documents, generators and validation
pub mod contract;

/// User configuration file
pub mod config;

/// JSON/YAML document output
pub mod output;

/// Command-line interface and tool server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
