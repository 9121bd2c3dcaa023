//! User configuration
//!
//! A small YAML file holding named connection strings and defaults for the
//! CLI. It lives at `$CONTRACT_GEN_CONFIG`, or `~/.contract-gen.yaml` when
//! that is unset. A missing file means "all defaults".
//!
//! ```yaml
//! version: "1.0"
//! connections:
//!   warehouse: postgresql://etl:secret@db:5432/dwh
//! defaults:
//!   csv:
//!     delimiter: ";"
//!     sample_size: 500
//!   output:
//!     format: yaml
//!     pretty: true
//! ```

use crate::decode::TextEncoding;
use crate::error::{Error, Result};
use crate::sources::{parse_delimiter, AnalyzeOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config location
pub const CONFIG_ENV: &str = "CONTRACT_GEN_CONFIG";

/// File name used in the home directory
pub const CONFIG_FILE_NAME: &str = ".contract-gen.yaml";

/// Prefix marking a named connection reference (`@warehouse`)
pub const CONNECTION_REF_PREFIX: char = '@';

fn default_version() -> String {
    "1.0".to_string()
}

fn default_sample_size() -> usize {
    1000
}

fn default_output_format() -> String {
    "json".to_string()
}

// ============================================================================
// Config Types
// ============================================================================

/// Complete user configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Named connection strings
    #[serde(default)]
    pub connections: BTreeMap<String, String>,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            connections: BTreeMap::new(),
            defaults: Defaults::default(),
        }
    }
}

/// Per-command defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub csv: CsvDefaults,
    #[serde(default)]
    pub json: JsonDefaults,
    #[serde(default)]
    pub database: DatabaseDefaults,
    #[serde(default)]
    pub output: OutputDefaults,
}

/// CSV analysis defaults; unset delimiter/encoding mean auto-detect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvDefaults {
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for CsvDefaults {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: None,
            sample_size: default_sample_size(),
        }
    }
}

/// JSON analysis defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDefaults {
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for JsonDefaults {
    fn default() -> Self {
        Self {
            encoding: None,
            sample_size: default_sample_size(),
        }
    }
}

/// Database analysis defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDefaults {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for DatabaseDefaults {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
        }
    }
}

/// Output defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDefaults {
    /// json or yaml
    #[serde(default = "default_output_format")]
    pub format: String,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputDefaults {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            pretty: false,
        }
    }
}

// ============================================================================
// Loading and Saving
// ============================================================================

/// Location of the config file
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(CONFIG_FILE_NAME)
}

impl UserConfig {
    /// Load from `path`; a missing or empty file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid YAML in '{}': {e}", path.display())))
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(config_path())
    }

    /// Write as YAML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Write a default config file; refuses to overwrite unless `force`
    pub fn init(path: impl AsRef<Path>, force: bool) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(Error::config(format!(
                "Config file already exists: {}. Use --force to overwrite",
                path.display()
            )));
        }
        Self::default().save(path)?;
        Ok(path.to_path_buf())
    }

    /// Human-readable problems; empty when the config is usable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !matches!(self.defaults.output.format.as_str(), "json" | "yaml") {
            errors.push("'defaults.output.format' must be 'json' or 'yaml'".to_string());
        }

        let sample_sizes = [
            ("defaults.csv.sample_size", self.defaults.csv.sample_size),
            ("defaults.json.sample_size", self.defaults.json.sample_size),
            ("defaults.database.sample_size", self.defaults.database.sample_size),
        ];
        for (field, value) in sample_sizes {
            if value == 0 {
                errors.push(format!("'{field}' must be positive"));
            }
        }

        if let Some(delimiter) = &self.defaults.csv.delimiter {
            if parse_delimiter(delimiter).is_err() {
                errors.push(format!(
                    "'defaults.csv.delimiter' must be a single character, got '{delimiter}'"
                ));
            }
        }
        let encodings = [
            ("defaults.csv.encoding", &self.defaults.csv.encoding),
            ("defaults.json.encoding", &self.defaults.json.encoding),
        ];
        for (field, value) in encodings {
            if let Some(encoding) = value {
                if encoding.parse::<TextEncoding>().is_err() {
                    errors.push(format!("'{field}' has unsupported encoding '{encoding}'"));
                }
            }
        }

        for (name, connection) in &self.connections {
            if connection.trim().is_empty() {
                errors.push(format!("connection '{name}' is empty"));
            }
        }

        errors
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Connection string stored under `name`
    pub fn get_connection(&self, name: &str) -> Result<&str> {
        self.connections
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::config(format!("Connection '{name}' not found in config")))
    }

    /// Resolve `@name` references; any other value is returned as is
    pub fn resolve_connection(&self, value: &str) -> Result<String> {
        match value.strip_prefix(CONNECTION_REF_PREFIX) {
            Some(name) => self.get_connection(name).map(ToString::to_string),
            None => Ok(value.to_string()),
        }
    }

    /// CSV analysis options from the defaults
    pub fn csv_options(&self) -> Result<AnalyzeOptions> {
        let mut options = AnalyzeOptions::new();
        if let Some(delimiter) = &self.defaults.csv.delimiter {
            options = options.with_delimiter(parse_delimiter(delimiter)?);
        }
        if let Some(encoding) = &self.defaults.csv.encoding {
            options = options.with_encoding(encoding.parse()?);
        }
        Ok(options)
    }

    /// JSON analysis options from the defaults
    pub fn json_options(&self) -> Result<AnalyzeOptions> {
        let mut options = AnalyzeOptions::new();
        if let Some(encoding) = &self.defaults.json.encoding {
            options = options.with_encoding(encoding.parse()?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig::load(dir.path().join("absent.yaml")).unwrap();

        assert_eq!(config.version, "1.0");
        assert!(config.connections.is_empty());
        assert_eq!(config.defaults.csv.delimiter, None);
        assert_eq!(config.defaults.csv.sample_size, 1000);
        assert_eq!(config.defaults.output.format, "json");
        assert!(!config.defaults.output.pretty);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.yaml");

        let mut config = UserConfig::default();
        config
            .connections
            .insert("test_db".to_string(), "postgresql://localhost/test".to_string());
        config.defaults.output.format = "yaml".to_string();
        config.save(&path).unwrap();

        let loaded = UserConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "defaults:\n  csv:\n    delimiter: '|'\n").unwrap();

        let config = UserConfig::load(&path).unwrap();
        assert_eq!(config.defaults.csv.delimiter.as_deref(), Some("|"));
        assert_eq!(config.defaults.csv.sample_size, 1000);
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.yaml");
        fs::write(&path, "invalid: yaml: content: [").unwrap();

        let err = UserConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid YAML"));

        fs::write(&path, "defaults:\n  csv:\n    sample_size: not_an_int\n").unwrap();
        assert!(UserConfig::load(&path).is_err());
    }

    #[test]
    fn test_init_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.yaml");

        assert_eq!(UserConfig::init(&path, false).unwrap(), path);
        let content: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["version"], serde_yaml::Value::from("1.0"));
        assert!(content.get("connections").is_some());
        assert!(content.get("defaults").is_some());

        let err = UserConfig::init(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        fs::write(&path, "existing: content").unwrap();
        UserConfig::init(&path, true).unwrap();
        assert_eq!(UserConfig::load(&path).unwrap(), UserConfig::default());
    }

    #[test]
    fn test_connections() {
        let mut config = UserConfig::default();
        config
            .connections
            .insert("prod_db".to_string(), "postgresql://localhost:5432/prod".to_string());

        assert_eq!(
            config.get_connection("prod_db").unwrap(),
            "postgresql://localhost:5432/prod"
        );
        assert_eq!(
            config.resolve_connection("@prod_db").unwrap(),
            "postgresql://localhost:5432/prod"
        );
        assert_eq!(
            config.resolve_connection("sqlite:///local.db").unwrap(),
            "sqlite:///local.db"
        );

        let err = config.get_connection("missing").unwrap_err();
        assert!(err.to_string().contains("Connection 'missing' not found"));
        assert!(config.resolve_connection("@missing").is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = UserConfig::default();
        assert!(config.validate().is_empty());

        config.defaults.output.format = "xml".to_string();
        config.defaults.json.sample_size = 0;
        config.defaults.csv.delimiter = Some(";;".to_string());
        config.defaults.csv.encoding = Some("ebcdic".to_string());

        let errors = config.validate();
        assert!(errors.contains(&"'defaults.output.format' must be 'json' or 'yaml'".to_string()));
        assert!(errors.contains(&"'defaults.json.sample_size' must be positive".to_string()));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_analyze_options_from_defaults() {
        let mut config = UserConfig::default();
        config.defaults.csv.delimiter = Some("tab".to_string());
        config.defaults.csv.encoding = Some("latin-1".to_string());

        let options = config.csv_options().unwrap();
        assert_eq!(options.delimiter, Some(b'\t'));
        assert_eq!(options.encoding, Some(TextEncoding::Latin1));
        assert_eq!(config.json_options().unwrap(), AnalyzeOptions::new());
    }
}
