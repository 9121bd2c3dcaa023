//! CLI module
//!
//! Command-line interface and tool server for contract generation.
//!
//! # Commands
//!
//! - `source` - Source contracts from CSV/JSON files and databases
//! - `destination` - Destination contracts from tables and OpenAPI operations
//! - `transformation` - Transformation contract linking a source and a destination
//! - `validate` - Validate contract files
//! - `config` - Manage the user configuration file
//! - `serve` - Start the HTTP tool server

mod commands;
mod handlers;
mod runner;
mod server;

pub use commands::{
    ApiCommand, Cli, Commands, ConfigCommand, DatabaseArgs, DatabaseSourceCommand,
    DestinationCommand, FileSourceArgs, ListFormat, OutputArgs, SourceCommand, TransformationArgs,
};
pub use handlers::{ContractHandler, ToolCallError, ToolSpec};
pub use runner::Runner;
pub use server::{router, serve};
