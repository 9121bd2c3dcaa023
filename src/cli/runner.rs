//! CLI runner - executes commands

use crate::cli::commands::{
    ApiCommand, Cli, Commands, ConfigCommand, DatabaseArgs, DatabaseSourceCommand,
    DestinationCommand, FileSourceArgs, ListFormat, OutputArgs, SourceCommand, TransformationArgs,
};
use crate::config::{config_path, UserConfig};
use crate::contract::{
    generate_destination_contract, generate_source_contract, generate_transformation_contract,
    validate_path, Contract, DestinationRequest, ValidationReport,
};
use crate::database::{
    extract_table_list, generate_database_multi_source_contracts,
    generate_database_source_contract, DatabaseEngine, DatabaseKind, DatabaseSourceRequest,
    DbSourceType, MultiSourceRequest, TableListing,
};
use crate::error::{Error, Result, ResultExt};
use crate::openapi::{extract_endpoint_list, load_openapi_document, EndpointSummary};
use crate::output::DocumentWriter;
use crate::sources::{parse_delimiter, AnalyzeOptions};
use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Source { command } => self.source(command),
            Commands::Destination { command } => self.destination(command),
            Commands::Transformation(args) => self.transformation(args),
            Commands::Validate { path, recursive } => self.validate(path, *recursive),
            Commands::Config { command } => self.config_command(command),
            Commands::Serve { port } => crate::cli::serve(*port).await,
        }
    }

    fn config_file(&self) -> PathBuf {
        self.cli.config.clone().unwrap_or_else(config_path)
    }

    fn load_config(&self) -> Result<UserConfig> {
        UserConfig::load(self.config_file())
    }

    // ========================================================================
    // Sources
    // ========================================================================

    fn source(&self, command: &SourceCommand) -> Result<()> {
        let config = self.load_config()?;
        match command {
            SourceCommand::Csv {
                path,
                file,
                delimiter,
                output,
            } => {
                let defaults = &config.defaults.csv;
                let delimiter = delimiter.clone().or_else(|| defaults.delimiter.clone());
                let encoding = file.encoding.clone().or_else(|| defaults.encoding.clone());
                let sample_size = file.sample_size.unwrap_or(defaults.sample_size);
                self.file_source(&config, path, file, delimiter, encoding, sample_size, output)
            }
            SourceCommand::Json { path, file, output } => {
                let defaults = &config.defaults.json;
                let encoding = file.encoding.clone().or_else(|| defaults.encoding.clone());
                let sample_size = file.sample_size.unwrap_or(defaults.sample_size);
                self.file_source(&config, path, file, None, encoding, sample_size, output)
            }
            SourceCommand::Database { command } => self.database_source(&config, command),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn file_source(
        &self,
        config: &UserConfig,
        path: &Path,
        file: &FileSourceArgs,
        delimiter: Option<String>,
        encoding: Option<String>,
        sample_size: usize,
        output: &OutputArgs,
    ) -> Result<()> {
        if !path.is_file() {
            return Err(Error::file_not_found(path.display().to_string()));
        }
        let path = path.canonicalize()?;

        let mut options = AnalyzeOptions::new();
        let mut metadata = JsonObject::new();
        metadata.insert("sample_size".to_string(), json!(sample_size));
        if let Some(delimiter) = delimiter {
            options = options.with_delimiter(parse_delimiter(&delimiter)?);
            metadata.insert("delimiter".to_string(), json!(delimiter));
        }
        if let Some(encoding) = encoding {
            options = options.with_encoding(encoding.parse()?);
            metadata.insert("encoding".to_string(), json!(encoding));
        }

        let contract = generate_source_contract(&path, &file.source_id, &options, Some(&metadata))?;
        emit(config, output, &Contract::from(contract))
    }

    fn database_source(&self, config: &UserConfig, command: &DatabaseSourceCommand) -> Result<()> {
        match command {
            DatabaseSourceCommand::List {
                connection,
                database,
                with_fields,
                format,
            } => {
                let engine = connect(config, connection, database)?;
                let tables = extract_table_list(&engine, database.schema.as_deref(), *with_fields)?;
                match format {
                    ListFormat::Json => print_json(&tables),
                    ListFormat::Text => {
                        print!(
                            "{}",
                            format_table_list(&tables, database.schema.as_deref(), *with_fields)
                        );
                        Ok(())
                    }
                }
            }
            DatabaseSourceCommand::Table {
                connection,
                table,
                source_id,
                view,
                database,
                sample_size,
                output,
            } => {
                let source_type = if *view {
                    DbSourceType::View
                } else {
                    DbSourceType::Table
                };
                let request = DatabaseSourceRequest {
                    source_id: source_id.clone(),
                    connection_string: config.resolve_connection(connection)?,
                    database_type: database.database_type.clone(),
                    source_type: source_type.to_string(),
                    source_name: Some(table.clone()),
                    query: None,
                    schema: database.schema.clone(),
                    sample_size: sample_size.unwrap_or(config.defaults.database.sample_size),
                    config: None,
                };
                let contract = generate_database_source_contract(&request)?;
                emit(config, output, &Contract::from(contract))
            }
            DatabaseSourceCommand::Query {
                connection,
                query,
                source_id,
                database,
                sample_size,
                output,
            } => {
                let request = DatabaseSourceRequest {
                    source_id: source_id.clone(),
                    connection_string: config.resolve_connection(connection)?,
                    database_type: database.database_type.clone(),
                    source_type: DbSourceType::Query.to_string(),
                    source_name: None,
                    query: Some(query.clone()),
                    schema: database.schema.clone(),
                    sample_size: sample_size.unwrap_or(config.defaults.database.sample_size),
                    config: None,
                };
                let contract = generate_database_source_contract(&request)?;
                emit(config, output, &Contract::from(contract))
            }
            DatabaseSourceCommand::Multi {
                connection,
                database,
                tables,
                no_relationships,
                sample_size,
                output,
            } => {
                let request = MultiSourceRequest {
                    connection_string: config.resolve_connection(connection)?,
                    database_type: database.database_type.clone(),
                    schema: database.schema.clone(),
                    tables: tables.clone(),
                    include_relationships: !*no_relationships,
                    sample_size: sample_size.unwrap_or(config.defaults.database.sample_size),
                    config: None,
                };
                let report = generate_database_multi_source_contracts(&request)?;
                info!(
                    generated = report.count,
                    requested = report.requested,
                    skipped = report.skipped.len(),
                    "Generated multi-table contracts"
                );
                emit(config, output, &report)
            }
        }
    }

    // ========================================================================
    // Destinations
    // ========================================================================

    fn destination(&self, command: &DestinationCommand) -> Result<()> {
        let config = self.load_config()?;
        match command {
            DestinationCommand::Csv {
                destination_id,
                output,
            } => {
                let request = DestinationRequest::new(destination_id);
                let contract = generate_destination_contract(&request)?;
                emit(&config, output, &Contract::from(contract))
            }
            DestinationCommand::Database {
                connection,
                table,
                destination_id,
                database,
                output,
            } => {
                let request = DestinationRequest {
                    connection_string: Some(config.resolve_connection(connection)?),
                    table_name: Some(table.clone()),
                    database_type: Some(database.database_type.clone()),
                    database_schema: database.schema.clone(),
                    ..DestinationRequest::new(destination_id)
                };
                let contract = generate_destination_contract(&request)?;
                emit(&config, output, &Contract::from(contract))
            }
            DestinationCommand::Api { command } => match command {
                ApiCommand::Generate {
                    spec,
                    endpoint,
                    destination_id,
                    method,
                    output,
                } => {
                    let request = DestinationRequest {
                        api_spec: Some(spec.display().to_string()),
                        endpoint: Some(endpoint.clone()),
                        method: Some(method.clone()),
                        ..DestinationRequest::new(destination_id)
                    };
                    let contract = generate_destination_contract(&request)?;
                    emit(&config, output, &Contract::from(contract))
                }
                ApiCommand::List {
                    spec,
                    with_fields,
                    method,
                    format,
                } => {
                    let doc = load_openapi_document(spec).with_context(|| {
                        format!("Failed to list endpoints in {}", spec.display())
                    })?;
                    let endpoints = extract_endpoint_list(&doc, *with_fields, method.as_deref());
                    match format {
                        ListFormat::Json => print_json(&endpoints),
                        ListFormat::Text => {
                            print!("{}", format_endpoint_list(&endpoints, *with_fields));
                            Ok(())
                        }
                    }
                }
            },
        }
    }

    // ========================================================================
    // Transformation / Validation / Config
    // ========================================================================

    fn transformation(&self, args: &TransformationArgs) -> Result<()> {
        let config = self.load_config()?;

        let mut settings = JsonObject::new();
        if let Some(batch_size) = args.batch_size {
            settings.insert("batch_size".to_string(), json!(batch_size));
        }
        if let Some(error_threshold) = args.error_threshold {
            settings.insert("error_threshold".to_string(), json!(error_threshold));
        }

        let contract = generate_transformation_contract(
            &args.transformation_id,
            &args.source_ref,
            &args.destination_ref,
            Some(&settings).filter(|s| !s.is_empty()),
        )?;
        emit(&config, &args.output, &Contract::from(contract))
    }

    fn validate(&self, path: &Path, recursive: bool) -> Result<()> {
        let report = validate_path(path, recursive)?;
        print!("{}", format_validation_report(&report));

        if report.results.is_empty() {
            return Err(Error::validation(format!(
                "No contract files found in {} (use --recursive to search subdirectories)",
                path.display()
            )));
        }
        if !report.all_valid() {
            return Err(Error::validation(format!(
                "{} of {} contract(s) failed validation",
                report.invalid,
                report.results.len()
            )));
        }
        Ok(())
    }

    fn config_command(&self, command: &ConfigCommand) -> Result<()> {
        let path = self.config_file();
        match command {
            ConfigCommand::Init { force } => {
                let written = UserConfig::init(&path, *force)?;
                println!("Config file written to {}", written.display());
                Ok(())
            }
            ConfigCommand::Show => {
                let config = UserConfig::load(&path)?;
                println!("# {}", path.display());
                print!("{}", serde_yaml::to_string(&config)?);
                Ok(())
            }
            ConfigCommand::Validate => {
                let config = UserConfig::load(&path)?;
                let problems = config.validate();
                if problems.is_empty() {
                    println!("Config file is valid: {}", path.display());
                    return Ok(());
                }
                for problem in &problems {
                    println!("  - {problem}");
                }
                Err(Error::config(format!(
                    "{} problem(s) in {}",
                    problems.len(),
                    path.display()
                )))
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn connect(
    config: &UserConfig,
    connection: &str,
    database: &DatabaseArgs,
) -> Result<DatabaseEngine> {
    let kind: DatabaseKind = database.database_type.parse()?;
    DatabaseEngine::connect(kind, &config.resolve_connection(connection)?)
}

/// Flags win over the config defaults
fn document_writer(config: &UserConfig, output: &OutputArgs) -> Result<DocumentWriter> {
    let format = match output.format {
        Some(format) => format,
        None => config.defaults.output.format.parse()?,
    };
    Ok(DocumentWriter::new()
        .with_format(format)
        .with_pretty(output.pretty || config.defaults.output.pretty))
}

fn emit<T: Serialize>(config: &UserConfig, output: &OutputArgs, document: &T) -> Result<()> {
    let writer = document_writer(config, output)?;
    writer.emit(output.output.as_deref(), document)?;
    if let Some(path) = &output.output {
        eprintln!("Contract written to {}", path.display());
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Text rendering of `source database list`
pub(crate) fn format_table_list(
    tables: &[TableListing],
    schema: Option<&str>,
    with_fields: bool,
) -> String {
    if tables.is_empty() {
        return "No tables found.\n".to_string();
    }

    let mut out = String::new();
    let schema_note = schema.map(|s| format!(" in schema '{s}'")).unwrap_or_default();
    let _ = writeln!(out, "Tables{schema_note} ({} total):", tables.len());
    for table in tables {
        let _ = writeln!(out, "  {} ({} columns)", table.name, table.column_count);
        if !with_fields {
            continue;
        }
        if let Some(columns) = &table.columns {
            for column in columns {
                let not_null = if column.nullable { "" } else { ", NOT NULL" };
                let _ = writeln!(out, "    - {} ({}{not_null})", column.name, column.data_type);
            }
        } else if let Some(error) = &table.error {
            let _ = writeln!(out, "    Error: {error}");
        }
        out.push('\n');
    }
    out
}

/// Text rendering of `destination api list`
pub(crate) fn format_endpoint_list(endpoints: &[EndpointSummary], with_fields: bool) -> String {
    if endpoints.is_empty() {
        return "No endpoints found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Endpoints ({} total):", endpoints.len());
    for endpoint in endpoints {
        let _ = writeln!(out, "  {:<6} {}", endpoint.method, endpoint.path);
        if !with_fields {
            continue;
        }
        match (&endpoint.fields, &endpoint.error) {
            (Some(fields), _) if !fields.is_empty() => {
                let _ = writeln!(out, "    Fields:");
                for field in fields {
                    let _ = writeln!(out, "      - {field}{}", required_marker(endpoint, field));
                }
            }
            (Some(_), _) => {
                let _ = writeln!(out, "    (No fields)");
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "    Error: {error}");
            }
            (None, None) => {
                let _ = writeln!(out, "    (No fields info)");
            }
        }
        out.push('\n');
    }
    out
}

fn required_marker(endpoint: &EndpointSummary, field: &str) -> &'static str {
    let required = endpoint
        .constraints
        .as_ref()
        .and_then(|c| c.get(field))
        .and_then(JsonValue::as_array)
        .is_some_and(|list| list.iter().any(|c| c.as_str() == Some("REQUIRED")));
    if required {
        " (Required)"
    } else {
        ""
    }
}

/// Text rendering of `validate`
pub(crate) fn format_validation_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    if report.results.len() > 1 {
        let _ = writeln!(out, "Validating {} contract(s)...\n", report.results.len());
    }
    for outcome in &report.results {
        let name = Path::new(&outcome.path)
            .file_name()
            .map_or_else(|| outcome.path.clone(), |n| n.to_string_lossy().to_string());
        if outcome.valid {
            let kind = outcome.contract_type.as_deref().unwrap_or("unknown");
            let _ = writeln!(out, "Valid {kind} contract: {name}");
        } else {
            let _ = writeln!(out, "Validation failed for {name}:");
            for error in &outcome.errors {
                let _ = writeln!(out, "  - {error}");
            }
        }
    }
    if report.results.len() > 1 {
        let _ = writeln!(out, "{}", "-".repeat(50));
        if report.invalid == 0 {
            let _ = writeln!(out, "All {} contract(s) are valid", report.valid);
        } else {
            let _ = writeln!(
                out,
                "{} of {} contract(s) failed validation",
                report.invalid,
                report.results.len()
            );
        }
    }
    out
}
