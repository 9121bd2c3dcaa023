//! Contract file validation

use super::types::Contract;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of validating one contract file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Summary over every validated file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationOutcome>,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationReport {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0 && !self.results.is_empty()
    }
}

/// Deserialize a contract document by its `contract_type` and check its
/// business rules. Returns every problem found.
pub fn parse_contract(value: JsonValue) -> std::result::Result<Contract, Vec<String>> {
    let contract_type = value
        .get("contract_type")
        .and_then(JsonValue::as_str)
        .map(ToString::to_string);

    match contract_type.as_deref() {
        Some("source" | "destination" | "transformation") => {}
        Some(other) => {
            return Err(vec![format!(
                "Unknown contract type: {other}. Contract must have contract_type: source, destination, or transformation"
            )])
        }
        None => return Err(vec!["Missing contract_type".to_string()]),
    }

    let contract: Contract = serde_json::from_value(value).map_err(|e| vec![e.to_string()])?;
    let problems = contract.validate();
    if problems.is_empty() {
        Ok(contract)
    } else {
        Err(problems)
    }
}

/// Load and parse a contract JSON file
pub fn load_contract(path: impl AsRef<Path>) -> Result<Contract> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }
    let value: JsonValue = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    parse_contract(value).map_err(|problems| Error::validation(problems.join("; ")))
}

/// Validate a single contract file
pub fn validate_contract_file(path: impl AsRef<Path>) -> ValidationOutcome {
    let path = path.as_ref();
    let mut outcome = ValidationOutcome {
        path: path.display().to_string(),
        valid: false,
        contract_type: None,
        contract_id: None,
        errors: Vec::new(),
    };

    let value = std::fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|text| Ok(serde_json::from_str::<JsonValue>(&text)?));

    match value {
        Ok(value) => match parse_contract(value) {
            Ok(contract) => {
                outcome.valid = true;
                outcome.contract_type = Some(contract.contract_type().to_string());
                outcome.contract_id = Some(contract.id().to_string());
            }
            Err(problems) => outcome.errors = problems,
        },
        Err(e) => outcome.errors.push(format!("Invalid JSON: {e}")),
    }

    debug!(path = %outcome.path, valid = outcome.valid, "Validated contract");
    outcome
}

/// Validate a file, or every `*.json` file in a directory
pub fn validate_path(path: impl AsRef<Path>, recursive: bool) -> Result<ValidationReport> {
    let path = path.as_ref();
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        let mut files = Vec::new();
        collect_json_files(path, recursive, &mut files)?;
        files.sort();
        files
    } else {
        return Err(Error::file_not_found(path.display().to_string()));
    };

    let mut report = ValidationReport::default();
    for file in files {
        let outcome = validate_contract_file(&file);
        if outcome.valid {
            report.valid += 1;
        } else {
            report.invalid += 1;
        }
        report.results.push(outcome);
    }
    Ok(report)
}

fn collect_json_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_json_files(&path, recursive, files)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}
