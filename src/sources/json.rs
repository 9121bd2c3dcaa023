//! JSON and NDJSON file analysis

use super::types::{AnalyzeOptions, FileFormat, SourceAnalysis, DISPLAY_ROWS, SAMPLE_ROWS};
use crate::decode::{read_text, TextEncoding};
use crate::error::Result;
use crate::schema::reconcile_rows;
use crate::types::SampleRow;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Analyze a JSON array or NDJSON file on disk
pub fn analyze_json_file(
    path: impl AsRef<Path>,
    options: &AnalyzeOptions,
) -> Result<SourceAnalysis> {
    let (text, encoding) = read_text(path, options.encoding)?;
    Ok(analyze_json_text(&text, encoding))
}

/// Analyze already decoded JSON or NDJSON text.
///
/// A document whose first non-whitespace character is `[` is read as one
/// array, anything else as one JSON value per line. Malformed input is
/// reported through `issues` rather than as an error.
pub fn analyze_json_text(text: &str, encoding: TextEncoding) -> SourceAnalysis {
    let content = text.trim_start_matches('\u{feff}');
    let is_array = content.trim_start().starts_with('[');

    let (format, values, total_rows, mut issues) = if is_array {
        let (values, total, issues) = read_array(content);
        (FileFormat::Json, values, total, issues)
    } else {
        let (values, total, issues) = read_lines(content);
        (FileFormat::Ndjson, values, total, issues)
    };

    if values.is_empty() {
        if issues.is_empty() {
            issues.push("File is empty or contains no valid objects".to_string());
        }
        return SourceAnalysis::empty(format, encoding, issues);
    }

    let fields: Vec<String> = values
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows: Vec<SampleRow> = values
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            fields
                .iter()
                .map(|field| obj.get(field).map(render_cell).unwrap_or_default())
                .collect()
        })
        .collect();

    let data_types = reconcile_rows(&rows, fields.len());

    debug!(
        format = format.name(),
        fields = fields.len(),
        total_rows,
        issues = issues.len(),
        "Analyzed JSON"
    );

    SourceAnalysis {
        format,
        encoding,
        has_header: false,
        total_rows,
        sample_fields: fields,
        sample_data: rows.into_iter().take(DISPLAY_ROWS).collect(),
        data_types,
        issues,
    }
}

fn read_array(content: &str) -> (Vec<Value>, usize, Vec<String>) {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => {
            let total = items.len();
            let sample = items.into_iter().take(SAMPLE_ROWS).collect();
            (sample, total, Vec::new())
        }
        Ok(_) => (Vec::new(), 0, vec!["JSON root is not a list".to_string()]),
        Err(_) => (Vec::new(), 0, vec!["Invalid JSON format".to_string()]),
    }
}

fn read_lines(content: &str) -> (Vec<Value>, usize, Vec<String>) {
    let mut values = Vec::new();
    let mut issues = Vec::new();
    let mut total = 0;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;

        match serde_json::from_str::<Value>(line) {
            Ok(value) if values.len() < SAMPLE_ROWS => values.push(value),
            Ok(_) => {}
            Err(_) => issues.push(format!("Invalid JSON on line {}", idx + 1)),
        }
    }

    (values, total, issues)
}

/// Render one JSON value as a flat cell string
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
