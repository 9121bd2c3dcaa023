//! CSV file analysis

use super::types::{AnalyzeOptions, FileFormat, SourceAnalysis, DISPLAY_ROWS, SAMPLE_ROWS};
use crate::decode::{detect_delimiter, read_text, TextEncoding};
use crate::error::Result;
use crate::schema::reconcile_rows;
use crate::types::SampleRow;
use std::path::Path;
use tracing::debug;

const BOM: char = '\u{feff}';

/// Issue recorded when a byte-order mark was removed from the header
pub const BOM_ISSUE: &str = "File contains UTF-8 BOM (Byte Order Mark) that was automatically \
                             stripped from field names. Ensure downstream processors handle the \
                             original file encoding correctly.";

/// Analyze a CSV file on disk
pub fn analyze_csv_file(
    path: impl AsRef<Path>,
    options: &AnalyzeOptions,
) -> Result<SourceAnalysis> {
    let (text, encoding) = read_text(path, options.encoding)?;
    analyze_csv_text(&text, encoding, options.delimiter)
}

/// Analyze already decoded CSV text
pub fn analyze_csv_text(
    text: &str,
    encoding: TextEncoding,
    delimiter: Option<u8>,
) -> Result<SourceAnalysis> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));
    let format = FileFormat::Csv {
        delimiter: char::from(delimiter).to_string(),
    };

    let has_bom = text.starts_with(BOM);
    let body = text.trim_start_matches(BOM);

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(body.as_bytes());

    let mut rows: Vec<SampleRow> = Vec::with_capacity(SAMPLE_ROWS);
    for record in reader.records().take(SAMPLE_ROWS) {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Ok(SourceAnalysis::empty(
            format,
            encoding,
            vec!["File is empty".to_string()],
        ));
    }

    // A leading BOM makes the first cell non-numeric, so it is always a header
    let has_header = has_bom || rows[0].iter().any(|cell| !looks_numeric_header(cell));

    let (fields, data_rows) = if has_header {
        let mut rows = rows.into_iter();
        let fields = rows.next().unwrap_or_default();
        (fields, rows.collect::<Vec<_>>())
    } else {
        let fields = (1..=rows[0].len()).map(|i| format!("column_{i}")).collect();
        (fields, rows)
    };

    // Without data rows every column stays empty
    let data_types = reconcile_rows(&data_rows, fields.len());

    // Line count approximation: one row per physical line
    let total_rows = text.lines().count().saturating_sub(usize::from(has_header));

    let mut issues = Vec::new();
    if has_bom {
        issues.push(BOM_ISSUE.to_string());
    }

    debug!(
        delimiter = %char::from(delimiter),
        fields = fields.len(),
        sampled = data_rows.len(),
        has_header,
        "Analyzed CSV"
    );

    Ok(SourceAnalysis {
        format,
        encoding,
        has_header,
        total_rows,
        sample_fields: fields,
        sample_data: data_rows.into_iter().take(DISPLAY_ROWS).collect(),
        data_types,
        issues,
    })
}

/// A header-row cell is "numeric" if only digits remain after dropping `.` and `-`
fn looks_numeric_header(cell: &str) -> bool {
    let stripped: String = cell.chars().filter(|c| *c != '.' && *c != '-').collect();
    !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit())
}
