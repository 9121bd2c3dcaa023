//! Column type vocabulary and merge rules

use serde::{Deserialize, Serialize};

/// Coarse type assigned to a column of a text-based source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every sampled value was blank
    #[default]
    Empty,
    /// Structurally looks like a date
    Date,
    /// Integer or decimal in US or European notation
    Numeric,
    /// Anything else
    Text,
}

impl ColumnType {
    /// Fold one observed cell type into the running type of a column.
    ///
    /// Blank observations never change what is known. Text is sticky and
    /// wins over any conflicting evidence. Date absorbs numeric in either
    /// order.
    #[must_use]
    pub fn merge_with(self, observed: ColumnType) -> ColumnType {
        match (self, observed) {
            (current, ColumnType::Empty) => current,
            (ColumnType::Empty, observed) => observed,
            (ColumnType::Text, _) | (_, ColumnType::Text) => ColumnType::Text,
            (ColumnType::Numeric, ColumnType::Date) => ColumnType::Date,
            (ColumnType::Date, ColumnType::Numeric) => ColumnType::Date,
            (current, _) => current,
        }
    }

    /// Get the type name as used in contracts
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Empty => "empty",
            ColumnType::Date => "date",
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notation a numeric sample appears to be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberNotation {
    Us,
    European,
}

/// Separator analysis of a single numeric sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFormat {
    pub has_comma_decimal: bool,
    pub has_thousands_sep: bool,
    pub format: NumberNotation,
}
