//! Request-body schema extraction from OpenAPI / Swagger documents

use crate::contract::DestinationSchema;
use crate::error::{Error, Result};
use crate::types::{FieldType, JsonObject, JsonValue};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Path-item keys that are not operations
const NON_OPERATION_KEYS: &[&str] = &["parameters", "$ref", "summary", "description"];

const JSON_CONTENT: &str = "application/json";
const FORM_CONTENT: &str = "application/x-www-form-urlencoded";

/// Load an OpenAPI document from a `.json`, `.yaml` or `.yml` file
pub fn load_openapi_document(path: impl AsRef<Path>) -> Result<JsonValue> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&text)?),
        Some("json") => Ok(serde_json::from_str(&text)?),
        _ => match serde_json::from_str(&text) {
            Ok(doc) => Ok(doc),
            Err(_) => Ok(serde_yaml::from_str(&text)?),
        },
    }
}

fn paths(doc: &JsonValue) -> Option<&JsonObject> {
    doc.get("paths").and_then(JsonValue::as_object)
}

/// Extract the request-body schema of one operation.
///
/// Swagger 2.0 `in: body` parameters and OpenAPI 3 `requestBody` are both
/// understood. An operation without a body yields an empty schema.
pub fn extract_endpoint_schema(
    doc: &JsonValue,
    endpoint: &str,
    method: &str,
) -> Result<DestinationSchema> {
    let method = method.to_uppercase();
    let empty = JsonObject::new();
    let paths = paths(doc).unwrap_or(&empty);

    let path_item = paths
        .get(endpoint)
        .ok_or_else(|| Error::EndpointNotFound {
            endpoint: endpoint.to_string(),
            available: paths.keys().cloned().collect(),
        })?;

    let operation = path_item
        .get(method.to_lowercase())
        .ok_or_else(|| Error::MethodNotFound {
            method: method.clone(),
            endpoint: endpoint.to_string(),
            available: path_item
                .as_object()
                .map(|item| {
                    item.keys()
                        .filter(|key| key.as_str() != "parameters")
                        .map(|key| key.to_uppercase())
                        .collect()
                })
                .unwrap_or_default(),
        })?;

    let Some((schema, body_required)) = request_body_schema(operation) else {
        debug!(endpoint, method = %method, "Operation has no request body");
        return Ok(DestinationSchema::default());
    };

    let schema = match schema.get("$ref").and_then(JsonValue::as_str) {
        Some(reference) => resolve_ref(doc, reference)?,
        None => schema,
    };

    Ok(schema_fields(schema, body_required))
}

/// Locate the body schema and whether the body itself is required
fn request_body_schema(operation: &JsonValue) -> Option<(&JsonValue, bool)> {
    let body_param = operation
        .get("parameters")
        .and_then(JsonValue::as_array)
        .and_then(|params| {
            params
                .iter()
                .find(|param| param.get("in").and_then(JsonValue::as_str) == Some("body"))
        });

    let (schema, required) = match body_param {
        Some(param) => (param.get("schema")?, is_true(param.get("required"))),
        None => {
            let body = operation.get("requestBody")?;
            let content = body.get("content")?;
            let media = content
                .get(JSON_CONTENT)
                .or_else(|| content.get(FORM_CONTENT))?;
            (media.get("schema")?, is_true(body.get("required")))
        }
    };

    let has_content = schema.as_object().is_some_and(|obj| !obj.is_empty());
    has_content.then_some((schema, required))
}

fn is_true(value: Option<&JsonValue>) -> bool {
    value.and_then(JsonValue::as_bool).unwrap_or(false)
}

/// Follow an internal `#/...` reference
pub fn resolve_ref<'a>(doc: &'a JsonValue, reference: &str) -> Result<&'a JsonValue> {
    let pointer = reference.strip_prefix('#').filter(|p| p.starts_with('/')).ok_or_else(|| {
        Error::validation(format!("Only internal references are supported: {reference}"))
    })?;

    doc.pointer(pointer)
        .ok_or_else(|| Error::validation(format!("Reference not found: {reference}")))
}

fn schema_fields(schema: &JsonValue, body_required: bool) -> DestinationSchema {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|list| list.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default();

    let mut result = DestinationSchema::default();
    let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) else {
        return result;
    };

    for (name, property) in properties {
        let json_type = property.get("type").and_then(JsonValue::as_str).unwrap_or("string");
        let format = property.get("format").and_then(JsonValue::as_str);

        let is_required = body_required || required.contains(&name.as_str());
        let constraints = property_constraints(property, json_type, is_required);
        if !constraints.is_empty() {
            result.constraints.insert(name.clone(), json!(constraints));
        }
        result.fields.push(name.clone());
        result.types.push(map_json_type(json_type, format).to_string());
    }

    result
}

fn property_constraints(property: &JsonValue, json_type: &str, required: bool) -> Vec<String> {
    let mut constraints = Vec::new();
    if required {
        constraints.push("REQUIRED".to_string());
    }

    if let Some(values) = property.get("enum").and_then(JsonValue::as_array) {
        let rendered: Vec<String> = values.iter().map(plain_text).collect();
        constraints.push(format!("ENUM: {}", rendered.join(", ")));
    }

    let bounds: &[(&str, &str)] = match json_type {
        "string" => &[
            ("minLength", "MIN_LENGTH"),
            ("maxLength", "MAX_LENGTH"),
            ("pattern", "PATTERN"),
        ],
        "integer" | "number" => &[("minimum", "MIN"), ("maximum", "MAX")],
        _ => &[],
    };
    for (key, label) in bounds {
        if let Some(value) = property.get(*key) {
            constraints.push(format!("{label}: {}", plain_text(value)));
        }
    }

    constraints
}

/// Strings without quotes, everything else as JSON
fn plain_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map a JSON-schema type (and optional format) to a contract field type
pub fn map_json_type(json_type: &str, format: Option<&str>) -> FieldType {
    let by_format = match format {
        Some("date-time") => Some(FieldType::Datetime),
        Some("date") => Some(FieldType::Date),
        Some("time") => Some(FieldType::Time),
        Some("email") => Some(FieldType::Email),
        Some("uri") => Some(FieldType::Url),
        Some("uuid") => Some(FieldType::Uuid),
        Some("int32") => Some(FieldType::Integer),
        Some("int64") => Some(FieldType::Bigint),
        Some("float") => Some(FieldType::Float),
        Some("double") => Some(FieldType::Double),
        _ => None,
    };
    if let Some(field_type) = by_format {
        return field_type;
    }

    match json_type {
        "integer" => FieldType::Integer,
        "number" => FieldType::Float,
        "boolean" => FieldType::Boolean,
        "array" => FieldType::Array,
        "object" => FieldType::Json,
        "null" => FieldType::Null,
        _ => FieldType::Text,
    }
}

/// One operation in an endpoint listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    pub method: String,
    pub path: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// List every operation in the document, optionally with its body schema.
///
/// A failing schema extraction marks that entry with `error` and the
/// listing continues.
pub fn extract_endpoint_list(
    doc: &JsonValue,
    with_fields: bool,
    method: Option<&str>,
) -> Vec<EndpointSummary> {
    let method_filter = method.map(str::to_uppercase);
    let Some(paths) = paths(doc) else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();
    for (path, item) in paths {
        let Some(item) = item.as_object().filter(|_| path.starts_with('/')) else {
            continue;
        };

        for (op_method, operation) in item {
            if NON_OPERATION_KEYS.contains(&op_method.to_lowercase().as_str()) {
                continue;
            }
            let upper = op_method.to_uppercase();
            if method_filter.as_ref().is_some_and(|m| *m != upper) {
                continue;
            }

            let mut entry = EndpointSummary {
                method: upper,
                path: path.clone(),
                summary: operation
                    .get("summary")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
                fields: None,
                types: None,
                constraints: None,
                error: None,
            };

            if with_fields {
                match extract_endpoint_schema(doc, path, &entry.method) {
                    Ok(schema) => {
                        entry.fields = Some(schema.fields);
                        entry.types = Some(schema.types);
                        entry.constraints = Some(schema.constraints);
                    }
                    Err(e) => {
                        debug!(
                            path = %path,
                            method = %entry.method,
                            "Schema extraction failed: {e}"
                        );
                        entry.error = Some("Failed to extract schema".to_string());
                    }
                }
            }

            endpoints.push(entry);
        }
    }

    endpoints
}
