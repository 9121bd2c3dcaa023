//! Value classification and multi-row type reconciliation

use super::types::{ColumnType, NumberNotation, NumericFormat};
use tracing::trace;

// ============================================================================
// Value Classifier
// ============================================================================

/// Classify one raw cell value.
///
/// The value is trimmed first. Checks run in priority order:
/// empty, date, numeric, text.
pub fn classify_value(raw: &str) -> ColumnType {
    let value = raw.trim();
    if value.is_empty() {
        ColumnType::Empty
    } else if is_date(value) {
        ColumnType::Date
    } else if is_numeric(value) {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

/// Structural date check: `YYYY-M[M]-D[D]` or any `a/b/c` of digit runs.
///
/// No calendar validation is performed.
pub fn is_date(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return false;
    }

    if value.contains('-') {
        let parts: Vec<&str> = value.split('-').collect();
        if let [year, month, day] = parts.as_slice() {
            if parts.iter().all(|p| all_digits(p))
                && year.len() == 4
                && (1..=2).contains(&month.len())
                && (1..=2).contains(&day.len())
            {
                return true;
            }
        }
    }

    if value.contains('/') {
        let parts: Vec<&str> = value.split('/').collect();
        if parts.len() == 3 && parts.iter().all(|p| all_digits(p)) {
            return true;
        }
    }

    false
}

/// Numeric check accepting US (`1,234.56`) and European (`1.234,56`)
/// notations plus one optional leading minus sign.
pub fn is_numeric(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return false;
    }

    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let has_dot = unsigned.contains('.');
    let has_comma = unsigned.contains(',');

    match (has_dot, has_comma) {
        (true, false) => all_digits(&unsigned.replace('.', "")),
        (false, true) => all_digits(&unsigned.replace(',', "")),
        (true, true) => {
            // Either locale reading is enough
            let as_us = unsigned.replace(',', "").replace('.', "");
            let as_european = unsigned.replace('.', "").replace(',', "");
            all_digits(&as_us) || all_digits(&as_european)
        }
        (false, false) => all_digits(unsigned),
    }
}

/// Inspect the separators of a numeric-looking sample.
///
/// `has_comma_decimal` only reports a comma that survives removal of all
/// commas, so plain `1234,56` is reported as US notation.
pub fn analyze_numeric_format(sample: &str) -> NumericFormat {
    let has_comma_decimal = sample.replace(',', "").contains(',') && !sample.contains('.');
    let has_thousands_sep = sample.contains(',') && sample.contains('.');

    NumericFormat {
        has_comma_decimal,
        has_thousands_sep,
        format: if has_comma_decimal {
            NumberNotation::European
        } else {
            NumberNotation::Us
        },
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Row Type Detector
// ============================================================================

/// Classify every value of one row, by position
pub fn detect_row_types<S: AsRef<str>>(row: &[S]) -> Vec<ColumnType> {
    row.iter().map(|v| classify_value(v.as_ref())).collect()
}

// ============================================================================
// Multi-Row Type Reconciler
// ============================================================================

/// Folds sampled rows into one type per column.
///
/// Rows shorter than the column count are padded with blanks, longer rows
/// are truncated.
#[derive(Debug, Clone)]
pub struct TypeReconciler {
    types: Vec<ColumnType>,
    rows_seen: usize,
}

impl TypeReconciler {
    /// Create a reconciler for `num_columns` columns, all starting as empty
    pub fn new(num_columns: usize) -> Self {
        Self {
            types: vec![ColumnType::Empty; num_columns],
            rows_seen: 0,
        }
    }

    /// Fold one row into the running column types
    pub fn observe<S: AsRef<str>>(&mut self, row: &[S]) {
        for (idx, running) in self.types.iter_mut().enumerate() {
            let observed = row
                .get(idx)
                .map_or(ColumnType::Empty, |v| classify_value(v.as_ref()));
            *running = running.merge_with(observed);
        }
        self.rows_seen += 1;
    }

    /// Number of rows folded so far
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Current per-column types
    pub fn types(&self) -> &[ColumnType] {
        &self.types
    }

    /// Consume the reconciler and return the final types
    pub fn finish(self) -> Vec<ColumnType> {
        trace!(
            rows = self.rows_seen,
            columns = self.types.len(),
            "Reconciled column types"
        );
        self.types
    }
}

/// Reconcile column types across all `rows` for `num_columns` columns
pub fn reconcile_rows<R, S>(rows: &[R], num_columns: usize) -> Vec<ColumnType>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut reconciler = TypeReconciler::new(num_columns);
    for row in rows {
        reconciler.observe(row.as_ref());
    }
    reconciler.finish()
}
