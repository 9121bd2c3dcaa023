//! Output module
//!
//! Serializes contracts and reports as JSON (compact or pretty) or YAML,
//! keeping keys in declaration order, to stdout or a file.

mod writer;

pub use writer::{DocumentWriter, OutputFormat};
