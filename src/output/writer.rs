//! Contract document writer
//!
//! Renders any serializable document as JSON or YAML and sends it to stdout
//! or a file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Document serialization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(Error::invalid_value(
                "format",
                format!("must be 'json' or 'yaml', got '{other}'"),
            )),
        }
    }
}

/// Rendering options for contract documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentWriter {
    format: OutputFormat,
    pretty: bool,
}

impl DocumentWriter {
    /// Compact JSON
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Indent JSON output; YAML is always block style
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Serialize `document` to text
    pub fn render<T: Serialize + ?Sized>(&self, document: &T) -> Result<String> {
        let text = match (self.format, self.pretty) {
            (OutputFormat::Json, true) => serde_json::to_string_pretty(document)?,
            (OutputFormat::Json, false) => serde_json::to_string(document)?,
            (OutputFormat::Yaml, _) => serde_yaml::to_string(document)?,
        };
        Ok(text)
    }

    /// Write `document` to `path`, creating parent directories
    pub fn write_file<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        document: &T,
    ) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::output(format!("Failed to create directory '{}': {e}", parent.display()))
            })?;
        }

        let mut text = self.render(document)?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        fs::write(path, text)
            .map_err(|e| Error::output(format!("Failed to write '{}': {e}", path.display())))
    }

    /// Write `document` to any writer, newline terminated
    pub fn write_to<T: Serialize + ?Sized, W: Write>(
        &self,
        out: &mut W,
        document: &T,
    ) -> Result<()> {
        let text = self.render(document)?;
        if text.ends_with('\n') {
            write!(out, "{text}")?;
        } else {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }

    /// Write to `path` when given, stdout otherwise
    pub fn emit<T: Serialize + ?Sized>(&self, path: Option<&Path>, document: &T) -> Result<()> {
        match path {
            Some(path) => self.write_file(path, document),
            None => self.write_to(&mut std::io::stdout().lock(), document),
        }
    }
}
