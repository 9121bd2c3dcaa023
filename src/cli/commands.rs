//! CLI commands and argument parsing

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate and validate data ingestion contracts
#[derive(Parser, Debug)]
#[command(name = "contract-gen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// User configuration file (YAML), overrides $CONTRACT_GEN_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate source contracts from files and databases
    Source {
        #[command(subcommand)]
        command: SourceCommand,
    },

    /// Generate destination contracts
    Destination {
        #[command(subcommand)]
        command: DestinationCommand,
    },

    /// Generate a transformation contract
    Transformation(TransformationArgs),

    /// Validate a contract file, or every contract in a directory
    Validate {
        /// Contract file or directory
        path: PathBuf,

        /// Search subdirectories too
        #[arg(short, long)]
        recursive: bool,
    },

    /// Manage the user configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Start the tool server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

// ============================================================================
// Sources
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Source contract from a CSV file
    Csv {
        /// Path to the CSV file
        path: PathBuf,

        #[command(flatten)]
        file: FileSourceArgs,

        /// CSV delimiter (default: auto-detect)
        #[arg(long)]
        delimiter: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Source contract from a JSON array or NDJSON file
    Json {
        /// Path to the JSON/NDJSON file
        path: PathBuf,

        #[command(flatten)]
        file: FileSourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Source contracts from databases
    Database {
        #[command(subcommand)]
        command: DatabaseSourceCommand,
    },
}

/// Options shared by file sources
#[derive(Args, Debug, Clone)]
pub struct FileSourceArgs {
    /// Unique identifier for this source
    #[arg(long = "id")]
    pub source_id: String,

    /// File encoding (default: auto-detect)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Rows to sample, recorded in the contract metadata
    #[arg(long)]
    pub sample_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum DatabaseSourceCommand {
    /// List tables in a database
    List {
        /// Connection string or @name from the config file
        connection: String,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Include column details
        #[arg(long)]
        with_fields: bool,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },

    /// Source contract from a table or view
    Table {
        /// Connection string or @name from the config file
        connection: String,

        /// Table or view name
        table: String,

        /// Unique identifier for this source
        #[arg(long = "id")]
        source_id: String,

        /// Treat the relation as a view
        #[arg(long)]
        view: bool,

        #[command(flatten)]
        database: DatabaseArgs,

        #[arg(long)]
        sample_size: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Source contract from a SQL query
    Query {
        /// Connection string or @name from the config file
        connection: String,

        /// SQL query
        query: String,

        /// Unique identifier for this source
        #[arg(long = "id")]
        source_id: String,

        #[command(flatten)]
        database: DatabaseArgs,

        #[arg(long)]
        sample_size: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Source contracts for many tables, in foreign-key load order
    Multi {
        /// Connection string or @name from the config file
        connection: String,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Tables to analyze (comma-separated, default: all)
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,

        /// Skip relationship detection and load ordering
        #[arg(long)]
        no_relationships: bool,

        #[arg(long)]
        sample_size: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Database kind and schema
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database type: postgresql, mysql, sqlite or duckdb
    #[arg(long = "type")]
    pub database_type: String,

    /// Database schema (default: public for PostgreSQL, main for SQLite/DuckDB)
    #[arg(long)]
    pub schema: Option<String>,
}

// ============================================================================
// Destinations
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum DestinationCommand {
    /// Destination contract with an empty schema
    Csv {
        /// Unique identifier for this destination
        #[arg(long = "id")]
        destination_id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Destination contract from an existing table
    Database {
        /// Connection string or @name from the config file
        connection: String,

        /// Table to inspect
        table: String,

        /// Unique identifier for this destination
        #[arg(long = "id")]
        destination_id: String,

        #[command(flatten)]
        database: DatabaseArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Destination contracts from OpenAPI documents
    Api {
        #[command(subcommand)]
        command: ApiCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// Destination contract from an operation's request body
    Generate {
        /// OpenAPI/Swagger document (JSON or YAML)
        spec: PathBuf,

        /// Endpoint path, e.g. /users
        endpoint: String,

        /// Unique identifier for this destination
        #[arg(long = "id")]
        destination_id: String,

        /// HTTP method
        #[arg(long, default_value = "POST")]
        method: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the operations of an OpenAPI document
    List {
        /// OpenAPI/Swagger document (JSON or YAML)
        spec: PathBuf,

        /// Include request body fields
        #[arg(long)]
        with_fields: bool,

        /// Only this HTTP method
        #[arg(long)]
        method: Option<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },
}

// ============================================================================
// Transformation / Config
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct TransformationArgs {
    /// Unique identifier for this transformation
    #[arg(long = "id")]
    pub transformation_id: String,

    /// Source contract id
    #[arg(long)]
    pub source_ref: String,

    /// Destination contract id
    #[arg(long)]
    pub destination_ref: String,

    #[arg(long)]
    pub batch_size: Option<u64>,

    /// Fraction of failed records tolerated, between 0 and 1
    #[arg(long)]
    pub error_threshold: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Check the configuration file for problems
    Validate,
}

// ============================================================================
// Output
// ============================================================================

/// Where and how a contract is written
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default from config: json)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Format of listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}
