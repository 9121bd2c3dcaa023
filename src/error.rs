//! Error types for contract-gen
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for contract-gen
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    CsvParse(#[from] csv::Error),

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("{message}")]
    Validation { message: String },

    // ============================================================================
    // Not Found Errors
    // ============================================================================
    #[error("Source file not found: {path}")]
    FileNotFound { path: String },

    #[error("Table '{table}' not found in schema '{schema}' or database")]
    TableNotFound { table: String, schema: String },

    #[error("Endpoint '{endpoint}' not found in schema. Available endpoints: {available:?}")]
    EndpointNotFound {
        endpoint: String,
        available: Vec<String>,
    },

    #[error(
        "Method '{method}' not found for endpoint '{endpoint}'. Available methods: {available:?}"
    )]
    MethodNotFound {
        method: String,
        endpoint: String,
        available: Vec<String>,
    },

    #[error("Query returned no results")]
    EmptyQueryResult,

    // ============================================================================
    // Database Errors
    // ============================================================================
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Unsupported database_type: {0}. Must be 'postgresql', 'mysql', 'sqlite' or 'duckdb'")]
    UnsupportedDatabase(String),

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a file-not-found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether the error names a resource that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound { .. }
                | Error::TableNotFound { .. }
                | Error::EndpointNotFound { .. }
                | Error::MethodNotFound { .. }
                | Error::EmptyQueryResult
        )
    }

    /// Whether the error is caused by bad caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::UnsupportedDatabase(_)
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
        )
    }
}

/// Result type alias for contract-gen
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::file_not_found("/tmp/missing.csv");
        assert_eq!(err.to_string(), "Source file not found: /tmp/missing.csv");

        let err = Error::TableNotFound {
            table: "users".to_string(),
            schema: "public".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Table 'users' not found in schema 'public' or database"
        );

        let err = Error::EndpointNotFound {
            endpoint: "/orders".to_string(),
            available: vec!["/users".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Endpoint '/orders' not found in schema. Available endpoints: [\"/users\"]"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::file_not_found("x").is_not_found());
        assert!(Error::EmptyQueryResult.is_not_found());
        assert!(!Error::validation("bad").is_not_found());

        assert!(Error::validation("bad").is_validation());
        assert!(Error::UnsupportedDatabase("oracle".to_string()).is_validation());
        assert!(!Error::config("x").is_validation());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
