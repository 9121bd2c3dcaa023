//! End-to-end tests over real files
//!
//! File → analysis → contract → JSON/YAML document → validation

use contract_gen::config::UserConfig;
use contract_gen::contract::{
    generate_destination_contract, generate_source_analysis, generate_source_contract,
    generate_transformation_contract, load_contract, validate_contract_file, validate_path,
    Contract, DestinationRequest, SourceLocation,
};
use contract_gen::output::{DocumentWriter, OutputFormat};
use contract_gen::sources::AnalyzeOptions;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ============================================================================
// File Sources
// ============================================================================

#[test]
fn test_bank_export_with_bom() {
    let dir = tempdir().unwrap();
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(
        b"Datum;Konto;Belopp\n;;190\n2025-10-10;Hyra;9,22\n2025-10-11;Mat;-16772,74\n",
    );
    let path = write(dir.path(), "bank.csv", &bytes);

    let contract =
        generate_source_contract(&path, "bank_csv", &AnalyzeOptions::new(), None).unwrap();

    assert_eq!(contract.source_id, "bank_csv");
    assert_eq!(contract.schema.fields, vec!["Datum", "Konto", "Belopp"]);
    assert_eq!(contract.schema.data_types, vec!["date", "text", "numeric"]);
    assert!(contract
        .quality_metrics
        .issues
        .iter()
        .any(|issue| issue.contains("BOM")));

    match &contract.location {
        SourceLocation::File(location) => {
            assert_eq!(location.file_format, "csv");
            assert_eq!(location.delimiter.as_deref(), Some(";"));
            assert!(location.has_header);
        }
        other => panic!("expected a file location, got {other:?}"),
    }
}

#[test]
fn test_ndjson_with_bad_line() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "events.ndjson",
        b"{\"id\": 1, \"kind\": \"open\"}\n{\"id\": 2, \"kind\": \n{\"id\": 3, \"user\": \"ada\"}\n",
    );

    let analysis = generate_source_analysis(&path, &AnalyzeOptions::new()).unwrap();

    assert_eq!(analysis.total_rows, 3);
    assert_eq!(analysis.issues, vec!["Invalid JSON on line 2".to_string()]);
    assert_eq!(analysis.sample_fields, vec!["id", "kind", "user"]);
}

#[test]
fn test_missing_source_file() {
    let err = generate_source_analysis("/nonexistent/data.csv", &AnalyzeOptions::new())
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_config_defaults_drive_analysis() {
    let dir = tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "config.yaml",
        b"defaults:\n  csv:\n    delimiter: '|'\n",
    );
    let data = write(dir.path(), "pipes.csv", b"a|b\n1|x\n2|y\n");

    let config = UserConfig::load(&config_path).unwrap();
    let options = config.csv_options().unwrap();
    let contract = generate_source_contract(&data, "pipes", &options, None).unwrap();

    assert_eq!(contract.schema.fields, vec!["a", "b"]);
    assert_eq!(contract.schema.data_types, vec!["numeric", "text"]);
}

// ============================================================================
// Contracts
// ============================================================================

#[test]
fn test_contracts_written_and_validated() {
    let dir = tempdir().unwrap();
    let data = write(dir.path(), "people.csv", b"id,name\n1,Alice\n2,Bob\n");
    let out = dir.path().join("contracts");

    let source = generate_source_contract(&data, "people", &AnalyzeOptions::new(), None).unwrap();
    let destination = generate_destination_contract(&DestinationRequest {
        schema: Some(
            json!({
                "fields": ["id", "name"],
                "types": ["integer", "text"],
                "constraints": {"id": ["NOT NULL", "PRIMARY KEY"]}
            })
            .as_object()
            .cloned()
            .unwrap(),
        ),
        ..DestinationRequest::new("dwh_people")
    })
    .unwrap();
    let transformation =
        generate_transformation_contract("people_to_dwh", "people", "dwh_people", None).unwrap();

    assert_eq!(destination.validation_rules.required_fields, vec!["id"]);
    assert_eq!(destination.validation_rules.unique_constraints, vec!["id"]);

    let writer = DocumentWriter::new().with_pretty(true);
    writer
        .write_file(out.join("source.json"), &Contract::from(source))
        .unwrap();
    writer
        .write_file(out.join("destination.json"), &Contract::from(destination))
        .unwrap();
    writer
        .write_file(out.join("nested/transformation.json"), &Contract::from(transformation))
        .unwrap();

    let report = validate_path(&out, false).unwrap();
    assert_eq!(report.valid, 2);
    assert!(report.all_valid());

    let report = validate_path(&out, true).unwrap();
    assert_eq!(report.valid, 3);
    assert_eq!(report.invalid, 0);

    let loaded = load_contract(out.join("nested/transformation.json")).unwrap();
    assert_eq!(loaded.contract_type(), "transformation");
    assert_eq!(loaded.id(), "people_to_dwh");
}

#[test]
fn test_header_only_csv_contract_is_valid() {
    let dir = tempdir().unwrap();
    let data = write(dir.path(), "columns.csv", b"a,b,c\n");

    let contract =
        generate_source_contract(&data, "columns", &AnalyzeOptions::new(), None).unwrap();
    assert_eq!(contract.schema.fields, vec!["a", "b", "c"]);
    assert_eq!(contract.schema.data_types, vec!["empty", "empty", "empty"]);

    let out = dir.path().join("columns.json");
    DocumentWriter::new()
        .write_file(&out, &Contract::from(contract))
        .unwrap();

    let outcome = validate_contract_file(&out);
    assert!(outcome.valid, "unexpected errors: {:?}", outcome.errors);
}

#[test]
fn test_invalid_contracts_are_reported() {
    let dir = tempdir().unwrap();
    write(dir.path(), "unknown.json", br#"{"contract_type": "pipeline"}"#);
    write(dir.path(), "broken.json", b"{ not json");
    write(
        dir.path(),
        "mismatch.json",
        br#"{
            "contract_type": "source",
            "source_id": "s",
            "source_path": "/data/s.csv",
            "file_format": "csv",
            "schema": {"fields": ["a", "b"], "data_types": ["text"]},
            "quality_metrics": {"total_rows": 0}
        }"#,
    );

    let report = validate_path(dir.path(), false).unwrap();
    assert_eq!(report.invalid, 3);
    assert!(!report.all_valid());

    let by_name = |name: &str| {
        report
            .results
            .iter()
            .find(|r| r.path.ends_with(name))
            .unwrap()
            .errors
            .join("; ")
    };
    assert!(by_name("unknown.json").contains("Unknown contract type: pipeline"));
    assert!(by_name("broken.json").starts_with("Invalid JSON"));
    assert!(by_name("mismatch.json").contains("2 fields but 1 data_types"));
}

#[test]
fn test_api_destination_from_yaml_document() {
    let dir = tempdir().unwrap();
    let spec = write(
        dir.path(),
        "openapi.yaml",
        br"openapi: 3.0.0
info:
  title: Users
  version: '1'
paths:
  /users:
    post:
      summary: Create user
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/User'
components:
  schemas:
    User:
      type: object
      required: [email]
      properties:
        email:
          type: string
          format: email
        age:
          type: integer
          minimum: 0
",
    );

    let contract = generate_destination_contract(&DestinationRequest {
        api_spec: Some(spec.display().to_string()),
        endpoint: Some("/users".to_string()),
        ..DestinationRequest::new("users_api")
    })
    .unwrap();

    assert_eq!(contract.schema.fields, vec!["email", "age"]);
    assert_eq!(contract.schema.types, vec!["email", "integer"]);
    assert_eq!(contract.validation_rules.required_fields, vec!["email"]);
    assert_eq!(contract.schema.constraints["email"], json!(["REQUIRED"]));

    let yaml = DocumentWriter::new()
        .with_format(OutputFormat::Yaml)
        .render(&Contract::from(contract))
        .unwrap();
    assert!(yaml.contains("destination_id: users_api"));
}
