//! Contract assembly from file, database and API analysis

use super::types::{
    DestinationContract, DestinationSchema, ExecutionPlan, FileLocation, QualityMetrics,
    SourceContract, SourceLocation, SourceSchema, TransformationContract,
};
use crate::database::{inspect_table_schema, DatabaseEngine, DatabaseKind};
use crate::error::{Error, Result};
use crate::openapi::{extract_endpoint_schema, load_openapi_document};
use crate::sources::{analyze_csv_file, analyze_json_file, AnalyzeOptions, SourceAnalysis};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Extensions routed to the JSON analyzer; everything else is read as CSV
const JSON_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson"];

// ============================================================================
// Source
// ============================================================================

/// Analyze a source file, choosing the analyzer by extension
pub fn generate_source_analysis(
    path: impl AsRef<Path>,
    options: &AnalyzeOptions,
) -> Result<SourceAnalysis> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| JSON_EXTENSIONS.contains(&ext.to_lowercase().as_str()));

    debug!(path = %path.display(), json = is_json, "Analyzing source file");
    if is_json {
        analyze_json_file(path, options)
    } else {
        analyze_csv_file(path, options)
    }
}

/// Generate a source contract for a file
pub fn generate_source_contract(
    path: impl AsRef<Path>,
    source_id: &str,
    options: &AnalyzeOptions,
    config: Option<&JsonObject>,
) -> Result<SourceContract> {
    let path = path.as_ref();
    let analysis = generate_source_analysis(path, options)?;

    let location = FileLocation {
        source_path: path.display().to_string(),
        file_format: analysis.format.name().to_string(),
        encoding: analysis.encoding.label().to_string(),
        delimiter: analysis.format.delimiter().map(ToString::to_string),
        has_header: analysis.has_header,
    };

    let schema = SourceSchema {
        data_types: analysis.type_names(),
        fields: analysis.sample_fields,
    };
    let quality_metrics = QualityMetrics {
        total_rows: analysis.total_rows as u64,
        sample_data: analysis.sample_data,
        issues: analysis.issues,
    };

    Ok(
        SourceContract::new(source_id, SourceLocation::File(location), schema, quality_metrics)
            .with_metadata(config.cloned().unwrap_or_default()),
    )
}

// ============================================================================
// Destination
// ============================================================================

/// Parameters of a destination contract.
///
/// The schema can come from an existing table (`connection_string` +
/// `table_name`), from an OpenAPI operation (`api_spec` + `endpoint`), or be
/// given explicitly. Explicit `schema` keys override inspected ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationRequest {
    pub destination_id: String,
    #[serde(default)]
    pub schema: Option<JsonObject>,
    #[serde(default)]
    pub config: Option<JsonObject>,
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub database_type: Option<String>,
    #[serde(default)]
    pub database_schema: Option<String>,
    /// Path to an OpenAPI document
    #[serde(default)]
    pub api_spec: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// HTTP method of the operation, POST when absent
    #[serde(default)]
    pub method: Option<String>,
}

impl DestinationRequest {
    pub fn new(destination_id: impl Into<String>) -> Self {
        Self {
            destination_id: destination_id.into(),
            ..Self::default()
        }
    }
}

/// Generate a destination contract
pub fn generate_destination_contract(request: &DestinationRequest) -> Result<DestinationContract> {
    let inspected = match (&request.connection_string, &request.table_name) {
        (Some(connection_string), Some(table)) => {
            inspect_database(request, connection_string, table)?
        }
        (Some(_), None) => return Err(Error::missing_field("table_name")),
        (None, _) => match (&request.api_spec, &request.endpoint) {
            (Some(spec), Some(endpoint)) => {
                let doc = load_openapi_document(spec)?;
                let method = request.method.as_deref().unwrap_or("POST");
                Some(extract_endpoint_schema(&doc, endpoint, method)?)
            }
            _ => None,
        },
    };

    let mut schema = inspected.unwrap_or_default();
    if let Some(overrides) = &request.schema {
        schema = schema.merge(overrides)?;
    }

    let mut contract = DestinationContract::new(&request.destination_id, schema);
    contract.metadata = request.config.clone().unwrap_or_default();
    Ok(contract)
}

/// Inspect the destination table. Failure is tolerated only when an
/// explicit schema was supplied.
fn inspect_database(
    request: &DestinationRequest,
    connection_string: &str,
    table: &str,
) -> Result<Option<DestinationSchema>> {
    let database_type = request.database_type.as_deref().ok_or_else(|| {
        Error::validation("database_type is required when connection_string is provided")
    })?;

    let inspected = database_type.parse::<DatabaseKind>().and_then(|kind| {
        let engine = DatabaseEngine::connect(kind, connection_string)?;
        inspect_table_schema(&engine, table, request.database_schema.as_deref())
    });

    match inspected {
        Ok(schema) => Ok(Some(schema)),
        Err(e) if request.schema.is_none() => Err(Error::validation(format!(
            "Failed to inspect database table: {e}"
        ))),
        Err(e) => {
            warn!(table, "Inspection failed, using the supplied schema: {e}");
            Ok(None)
        }
    }
}

// ============================================================================
// Transformation
// ============================================================================

/// Generate a transformation contract.
///
/// `batch_size` and `error_threshold` are read from `config` when present;
/// the whole config is also kept as metadata.
pub fn generate_transformation_contract(
    transformation_id: &str,
    source_ref: &str,
    destination_ref: &str,
    config: Option<&JsonObject>,
) -> Result<TransformationContract> {
    let mut plan = ExecutionPlan::default();
    if let Some(config) = config {
        if let Some(value) = config.get("batch_size") {
            plan.batch_size = value
                .as_u64()
                .ok_or_else(|| Error::invalid_value("batch_size", "must be a positive integer"))?;
        }
        if let Some(value) = config.get("error_threshold") {
            plan.error_threshold = value
                .as_f64()
                .ok_or_else(|| Error::invalid_value("error_threshold", "must be a number"))?;
        }
    }

    let mut contract = TransformationContract::new(transformation_id, source_ref, destination_ref);
    contract.execution_plan = plan;
    contract.metadata = config.cloned().unwrap_or_default();

    if let Some(JsonValue::Object(mappings)) = config.and_then(|c| c.get("field_mappings")) {
        contract.field_mappings = mappings
            .iter()
            .filter_map(|(dest, src)| src.as_str().map(|src| (dest.clone(), src.to_string())))
            .collect();
    }

    let problems = super::Contract::from(contract.clone()).validate();
    if !problems.is_empty() {
        return Err(Error::validation(problems.join("; ")));
    }
    Ok(contract)
}
