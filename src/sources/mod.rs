//! File source analyzers
//!
//! Each analyzer reads a bounded sample of a file and reports the field
//! names, sampled rows, an approximate row count, inferred column types
//! and any quality issues found along the way.
//!
//! # Formats
//!
//! - **CSV**: delimiter sniffing, header detection, BOM stripping
//! - **JSON**: a single top-level array of objects
//! - **NDJSON**: one JSON document per line, bad lines reported as issues

mod csv;
mod json;
mod types;

pub use self::csv::{analyze_csv_file, analyze_csv_text, BOM_ISSUE};
pub use self::json::{analyze_json_file, analyze_json_text};
pub use self::types::{
    parse_delimiter, AnalyzeOptions, FileFormat, SourceAnalysis, DISPLAY_ROWS, SAMPLE_ROWS,
};
