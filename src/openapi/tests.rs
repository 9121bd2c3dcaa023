use super::*;
use crate::types::FieldType;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;

fn petstore() -> serde_json::Value {
    json!({
        "openapi": "3.0.0",
        "paths": {
            "/users": {
                "parameters": [],
                "get": {"summary": "List users"},
                "post": {
                    "summary": "Create user",
                    "requestBody": {
                        "required": false,
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/User"}
                            }
                        }
                    }
                }
            },
            "/login": {
                "post": {
                    "requestBody": {
                        "content": {
                            "application/x-www-form-urlencoded": {
                                "schema": {
                                    "type": "object",
                                    "properties": {"username": {"type": "string"}}
                                }
                            }
                        }
                    }
                }
            },
            "/broken": {
                "put": {
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/Missing"}
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "User": {
                    "type": "object",
                    "required": ["email"],
                    "properties": {
                        "email": {"type": "string", "format": "email", "maxLength": 120},
                        "age": {"type": "integer", "minimum": 0, "maximum": 150},
                        "role": {"type": "string", "enum": ["admin", "member"]},
                        "tags": {"type": "array"},
                        "id": {"type": "string", "format": "uuid"},
                        "note": {}
                    }
                }
            }
        }
    })
}

#[test]
fn test_extract_schema_with_ref() {
    let schema = extract_endpoint_schema(&petstore(), "/users", "post").unwrap();

    assert_eq!(schema.fields, vec!["email", "age", "role", "tags", "id", "note"]);
    assert_eq!(
        schema.types,
        vec!["email", "integer", "text", "array", "uuid", "text"]
    );
    assert_eq!(
        schema.constraints["email"],
        json!(["REQUIRED", "MAX_LENGTH: 120"])
    );
    assert_eq!(schema.constraints["age"], json!(["MIN: 0", "MAX: 150"]));
    assert_eq!(schema.constraints["role"], json!(["ENUM: admin, member"]));
    assert!(!schema.constraints.contains_key("tags"));
}

#[test]
fn test_operation_without_body_is_empty() {
    let schema = extract_endpoint_schema(&petstore(), "/users", "GET").unwrap();
    assert!(schema.fields.is_empty());
    assert!(schema.types.is_empty());
    assert!(schema.constraints.is_empty());
}

#[test]
fn test_form_content_fallback() {
    let schema = extract_endpoint_schema(&petstore(), "/login", "POST").unwrap();
    assert_eq!(schema.fields, vec!["username"]);
    assert_eq!(schema.types, vec!["text"]);
}

#[test]
fn test_swagger_body_parameter() {
    let doc = json!({
        "swagger": "2.0",
        "paths": {
            "/items": {
                "post": {
                    "parameters": [
                        {"in": "query", "name": "dry_run"},
                        {
                            "in": "body",
                            "required": true,
                            "schema": {
                                "properties": {
                                    "sku": {"type": "string"},
                                    "price": {"type": "number", "format": "double"}
                                }
                            }
                        }
                    ]
                }
            }
        }
    });

    let schema = extract_endpoint_schema(&doc, "/items", "post").unwrap();
    assert_eq!(schema.types, vec!["text", "double"]);
    // A required body makes every field required
    assert_eq!(schema.constraints["price"], json!(["REQUIRED"]));
}

#[test]
fn test_unknown_endpoint_lists_available() {
    let err = extract_endpoint_schema(&petstore(), "/orders", "POST").unwrap_err();
    assert!(err.is_not_found());
    let message = err.to_string();
    assert!(message.starts_with("Endpoint '/orders' not found in schema."));
    assert!(message.contains("/users"));
}

#[test]
fn test_unknown_method_lists_available() {
    let err = extract_endpoint_schema(&petstore(), "/users", "DELETE").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Method 'DELETE' not found for endpoint '/users'. Available methods: [\"GET\", \"POST\"]"
    );
}

#[test]
fn test_unresolvable_ref() {
    let err = extract_endpoint_schema(&petstore(), "/broken", "PUT").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "Reference not found: #/components/schemas/Missing"
    );

    let err = resolve_ref(&petstore(), "other.json#/User").unwrap_err();
    assert!(err.to_string().starts_with("Only internal references"));
}

#[test]
fn test_map_json_type() {
    assert_eq!(map_json_type("string", Some("date-time")), FieldType::Datetime);
    assert_eq!(map_json_type("string", Some("uri")), FieldType::Url);
    assert_eq!(map_json_type("integer", Some("int64")), FieldType::Bigint);
    assert_eq!(map_json_type("number", None), FieldType::Float);
    assert_eq!(map_json_type("object", None), FieldType::Json);
    assert_eq!(map_json_type("null", None), FieldType::Null);
    assert_eq!(map_json_type("string", Some("binary")), FieldType::Text);
    assert_eq!(map_json_type("mystery", None), FieldType::Text);
}

#[test]
fn test_endpoint_list() {
    let endpoints = extract_endpoint_list(&petstore(), false, None);

    let ops: Vec<(&str, &str)> = endpoints
        .iter()
        .map(|e| (e.method.as_str(), e.path.as_str()))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("GET", "/users"),
            ("POST", "/users"),
            ("POST", "/login"),
            ("PUT", "/broken")
        ]
    );
    assert_eq!(endpoints[0].summary, "List users");
    assert_eq!(endpoints[2].summary, "");
    assert!(endpoints[0].fields.is_none());
}

#[test]
fn test_endpoint_list_with_fields_and_filter() {
    let endpoints = extract_endpoint_list(&petstore(), true, Some("put"));
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].error.as_deref(), Some("Failed to extract schema"));

    let endpoints = extract_endpoint_list(&petstore(), true, Some("POST"));
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].fields.as_ref().unwrap().len(), 6);

    let json = serde_json::to_value(&endpoints[1]).unwrap();
    assert_eq!(json["fields"], json!(["username"]));
    assert!(json.get("error").is_none());
}

#[test]
fn test_load_yaml_document() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "openapi: 3.0.0\npaths:\n  /ping:\n    get:\n      summary: Ping"
    )
    .unwrap();

    let doc = load_openapi_document(file.path()).unwrap();
    let endpoints = extract_endpoint_list(&doc, false, None);
    assert_eq!(endpoints[0].path, "/ping");

    assert!(load_openapi_document("/no/such/spec.json")
        .unwrap_err()
        .is_not_found());
}
