//! OpenAPI destinations
//!
//! Reads the request-body schema of an API operation and turns it into a
//! destination schema (fields, contract types, constraints such as
//! `REQUIRED`, `ENUM: a, b` or `MAX_LENGTH: 64`).

mod introspection;

pub use introspection::{
    extract_endpoint_list, extract_endpoint_schema, load_openapi_document, map_json_type,
    resolve_ref, EndpointSummary,
};

#[cfg(test)]
mod tests;
