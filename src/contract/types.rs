//! Contract document models
//!
//! Three kinds of contract share one envelope: a `contract_type` tag, a
//! `contract_version` and free-form `metadata`. Everything here round-trips
//! through JSON and YAML unchanged.

use crate::database::{DatabaseKind, DbSourceType};
use crate::types::{JsonObject, JsonValue, SampleRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version written into every generated contract
pub const CONTRACT_VERSION: &str = "1.0";

fn default_version() -> String {
    CONTRACT_VERSION.to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Contract Envelope
// ============================================================================

/// Any contract document, discriminated by `contract_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contract_type", rename_all = "lowercase")]
pub enum Contract {
    Source(SourceContract),
    Destination(DestinationContract),
    Transformation(TransformationContract),
}

impl Contract {
    /// Value of the `contract_type` tag
    pub fn contract_type(&self) -> &'static str {
        match self {
            Contract::Source(_) => "source",
            Contract::Destination(_) => "destination",
            Contract::Transformation(_) => "transformation",
        }
    }

    /// The contract's own identifier
    pub fn id(&self) -> &str {
        match self {
            Contract::Source(c) => &c.source_id,
            Contract::Destination(c) => &c.destination_id,
            Contract::Transformation(c) => &c.transformation_id,
        }
    }

    pub fn metadata(&self) -> &JsonObject {
        match self {
            Contract::Source(c) => &c.metadata,
            Contract::Destination(c) => &c.metadata,
            Contract::Transformation(c) => &c.metadata,
        }
    }

    /// Business-rule violations; empty when the contract is valid
    pub fn validate(&self) -> Vec<String> {
        match self {
            Contract::Source(c) => c.validate(),
            Contract::Destination(c) => c.validate(),
            Contract::Transformation(c) => c.validate(),
        }
    }
}

impl From<SourceContract> for Contract {
    fn from(contract: SourceContract) -> Self {
        Contract::Source(contract)
    }
}

impl From<DestinationContract> for Contract {
    fn from(contract: DestinationContract) -> Self {
        Contract::Destination(contract)
    }
}

impl From<TransformationContract> for Contract {
    fn from(contract: TransformationContract) -> Self {
        Contract::Transformation(contract)
    }
}

// ============================================================================
// Source Contract
// ============================================================================

/// Field names and detected types of a source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSchema {
    pub fields: Vec<String>,
    pub data_types: Vec<String>,
}

/// Row count, sample rows and issues found while analyzing a source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_rows: u64,
    #[serde(default)]
    pub sample_data: Vec<SampleRow>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Where a source lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceLocation {
    File(FileLocation),
    Database(DatabaseLocation),
}

/// A source backed by a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub source_path: String,
    /// csv, json or ndjson
    pub file_format: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default = "default_true")]
    pub has_header: bool,
}

/// A source backed by a database table, view or query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseLocation {
    pub database_type: DatabaseKind,
    #[serde(default)]
    pub source_type: DbSourceType,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub database_schema: Option<String>,
}

/// Contract describing a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContract {
    #[serde(default = "default_version")]
    pub contract_version: String,
    pub source_id: String,
    #[serde(flatten)]
    pub location: SourceLocation,
    pub schema: SourceSchema,
    pub quality_metrics: QualityMetrics,
    #[serde(default)]
    pub metadata: JsonObject,
}

impl SourceContract {
    pub fn new(
        source_id: impl Into<String>,
        location: SourceLocation,
        schema: SourceSchema,
        quality_metrics: QualityMetrics,
    ) -> Self {
        Self {
            contract_version: default_version(),
            source_id: source_id.into(),
            location,
            schema,
            quality_metrics,
            metadata: JsonObject::new(),
        }
    }

    /// Replace the metadata object
    pub fn with_metadata(mut self, metadata: JsonObject) -> Self {
        self.metadata = metadata;
        self
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.source_id.trim().is_empty() {
            problems.push("source_id must not be empty".to_string());
        }
        if self.schema.fields.len() != self.schema.data_types.len() {
            problems.push(format!(
                "schema has {} fields but {} data_types",
                self.schema.fields.len(),
                self.schema.data_types.len()
            ));
        }
        problems
    }
}

// ============================================================================
// Destination Contract
// ============================================================================

/// Target schema of a destination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DestinationSchema {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    /// Per-field constraint lists (or any JSON the caller supplies)
    #[serde(default)]
    pub constraints: JsonObject,
}

impl DestinationSchema {
    /// Overlay the keys present in `overrides` on top of this schema
    pub fn merge(mut self, overrides: &JsonObject) -> crate::Result<Self> {
        if let Some(fields) = overrides.get("fields") {
            self.fields = serde_json::from_value(fields.clone())?;
        }
        if let Some(types) = overrides.get("types") {
            self.types = serde_json::from_value(types.clone())?;
        }
        if let Some(constraints) = overrides.get("constraints") {
            self.constraints = serde_json::from_value(constraints.clone())?;
        }
        Ok(self)
    }

    /// Fields carrying the given constraint, in field order
    pub fn fields_with_constraint(&self, constraint: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| {
                self.constraints
                    .get(field.as_str())
                    .and_then(JsonValue::as_array)
                    .is_some_and(|list| list.iter().any(|c| c.as_str() == Some(constraint)))
            })
            .cloned()
            .collect()
    }
}

/// Checks a loader applies to records bound for a destination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub unique_constraints: Vec<String>,
    #[serde(default)]
    pub data_range_checks: JsonObject,
    #[serde(default)]
    pub format_validation: JsonObject,
}

impl ValidationRules {
    /// Required fields come from `NOT NULL` (tables) or `REQUIRED` (APIs),
    /// unique ones from `PRIMARY KEY`
    pub fn from_schema(schema: &DestinationSchema) -> Self {
        let not_null = schema.fields_with_constraint("NOT NULL");
        let required = schema.fields_with_constraint("REQUIRED");
        Self {
            required_fields: schema
                .fields
                .iter()
                .filter(|field| not_null.contains(field) || required.contains(field))
                .cloned()
                .collect(),
            unique_constraints: schema.fields_with_constraint("PRIMARY KEY"),
            ..Self::default()
        }
    }
}

/// Contract describing a data destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationContract {
    #[serde(default = "default_version")]
    pub contract_version: String,
    pub destination_id: String,
    pub schema: DestinationSchema,
    #[serde(default)]
    pub validation_rules: ValidationRules,
    #[serde(default)]
    pub metadata: JsonObject,
}

impl DestinationContract {
    pub fn new(destination_id: impl Into<String>, schema: DestinationSchema) -> Self {
        Self {
            contract_version: default_version(),
            destination_id: destination_id.into(),
            validation_rules: ValidationRules::from_schema(&schema),
            schema,
            metadata: JsonObject::new(),
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.destination_id.trim().is_empty() {
            problems.push("destination_id must not be empty".to_string());
        }
        if !self.schema.types.is_empty() && self.schema.types.len() != self.schema.fields.len() {
            problems.push(format!(
                "schema has {} fields but {} types",
                self.schema.fields.len(),
                self.schema.types.len()
            ));
        }
        for field in &self.validation_rules.required_fields {
            if !self.schema.fields.contains(field) {
                problems.push(format!("required field '{field}' is not in the schema"));
            }
        }
        problems
    }
}

// ============================================================================
// Transformation Contract
// ============================================================================

/// How a transformation is executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f64,
    #[serde(default = "default_true")]
    pub validation_enabled: bool,
    #[serde(default)]
    pub rollback_on_error: bool,
}

fn default_batch_size() -> u64 {
    100
}

fn default_error_threshold() -> f64 {
    0.1
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            error_threshold: default_error_threshold(),
            validation_enabled: true,
            rollback_on_error: false,
        }
    }
}

/// Contract mapping a source onto a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationContract {
    #[serde(default = "default_version")]
    pub contract_version: String,
    pub transformation_id: String,
    pub source_ref: String,
    pub destination_ref: String,
    /// Destination field -> source field
    #[serde(default)]
    pub field_mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub transformations: JsonObject,
    #[serde(default)]
    pub enrichment: JsonObject,
    #[serde(default)]
    pub business_rules: Vec<JsonValue>,
    #[serde(default)]
    pub execution_plan: ExecutionPlan,
    #[serde(default)]
    pub metadata: JsonObject,
}

impl TransformationContract {
    pub fn new(
        transformation_id: impl Into<String>,
        source_ref: impl Into<String>,
        destination_ref: impl Into<String>,
    ) -> Self {
        Self {
            contract_version: default_version(),
            transformation_id: transformation_id.into(),
            source_ref: source_ref.into(),
            destination_ref: destination_ref.into(),
            field_mappings: BTreeMap::new(),
            transformations: JsonObject::new(),
            enrichment: JsonObject::new(),
            business_rules: Vec::new(),
            execution_plan: ExecutionPlan::default(),
            metadata: JsonObject::new(),
        }
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.transformation_id.trim().is_empty() {
            problems.push("transformation_id must not be empty".to_string());
        }
        if self.execution_plan.batch_size < 1 {
            problems.push("execution_plan.batch_size must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.execution_plan.error_threshold) {
            problems.push(format!(
                "execution_plan.error_threshold must be between 0 and 1, got {}",
                self.execution_plan.error_threshold
            ));
        }
        problems
    }
}
