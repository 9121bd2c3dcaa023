//! Type inference module
//!
//! Infers column types from sampled text values.
//!
//! # Features
//!
//! - **Value Classification**: empty, date, numeric or text per cell
//! - **Locale Tolerance**: US and European number notation both count as numeric
//! - **Sparse Data**: leading blank cells never hide later evidence
//! - **Deterministic Merging**: per-column fold with a fixed precedence

mod inference;
mod types;

pub use inference::{
    analyze_numeric_format, classify_value, detect_row_types, is_date, is_numeric,
    reconcile_rows, TypeReconciler,
};
pub use types::{ColumnType, NumberNotation, NumericFormat};
