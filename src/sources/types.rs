//! File analysis result types

use crate::decode::TextEncoding;
use crate::error::{Error, Result};
use crate::schema::ColumnType;
use crate::types::SampleRow;
use serde::{Deserialize, Serialize};

/// Maximum number of rows read for type detection
pub const SAMPLE_ROWS: usize = 10;

/// Maximum number of rows echoed back in `sample_data`
pub const DISPLAY_ROWS: usize = 5;

/// Format-specific attributes of an analyzed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "file_type", rename_all = "lowercase")]
pub enum FileFormat {
    /// Delimited text
    Csv { delimiter: String },
    /// A single top-level JSON array
    Json,
    /// One JSON document per line
    Ndjson,
}

impl FileFormat {
    /// Short format name (`csv`, `json`, `ndjson`)
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Csv { .. } => "csv",
            FileFormat::Json => "json",
            FileFormat::Ndjson => "ndjson",
        }
    }

    /// Delimiter for delimited formats
    pub fn delimiter(&self) -> Option<&str> {
        match self {
            FileFormat::Csv { delimiter } => Some(delimiter),
            _ => None,
        }
    }
}

/// Result of analyzing a file source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    #[serde(flatten)]
    pub format: FileFormat,
    pub encoding: TextEncoding,
    pub has_header: bool,
    pub total_rows: usize,
    pub sample_fields: Vec<String>,
    #[serde(default)]
    pub sample_data: Vec<SampleRow>,
    pub data_types: Vec<ColumnType>,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl SourceAnalysis {
    /// An analysis with no fields, rows or types
    pub fn empty(format: FileFormat, encoding: TextEncoding, issues: Vec<String>) -> Self {
        Self {
            format,
            encoding,
            has_header: false,
            total_rows: 0,
            sample_fields: Vec::new(),
            sample_data: Vec::new(),
            data_types: Vec::new(),
            issues,
        }
    }

    /// Type names as written into contracts
    pub fn type_names(&self) -> Vec<String> {
        self.data_types.iter().map(ToString::to_string).collect()
    }
}

/// Caller overrides for file analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Skip delimiter sniffing and use this byte
    pub delimiter: Option<u8>,
    /// Skip encoding detection and decode with this encoding
    pub encoding: Option<TextEncoding>,
}

impl AnalyzeOptions {
    /// Create options with everything auto-detected
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Force an encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// Parse a user-supplied delimiter (a single ASCII character, `\t` accepted)
pub fn parse_delimiter(value: &str) -> Result<u8> {
    let value = if value == "\\t" || value.eq_ignore_ascii_case("tab") {
        "\t"
    } else {
        value
    };
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(Error::invalid_value(
            "delimiter",
            format!("expected a single ASCII character, got '{value}'"),
        )),
    }
}
