//! Row filtering with typed predicates.
//!
//! Equality and containment compare the cell's text form. Ordering
//! operators coerce the cell to a number; a cell that isn't numeric never
//! matches. Results from several files are aligned by column name.

use super::{stack_by_name, Part};
use crate::error::{EngineError, EngineResult};
use crate::models::cell::parse_number;
use crate::models::{CellValue, NamedTable, Table};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// The eight recognized comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl Condition {
    pub const ALL: [Condition; 8] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessOrEqual => "less_or_equal",
        }
    }

}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = EngineError;

    /// Accepts the snake_case names (hyphens allowed), comparison symbols,
    /// and the Chinese operator labels used by the web form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let condition = match normalized.as_str() {
            "equals" | "eq" | "==" | "=" | "等于" => Self::Equals,
            "not_equals" | "ne" | "!=" | "<>" | "不等于" => Self::NotEquals,
            "contains" | "包含" => Self::Contains,
            "not_contains" | "不包含" => Self::NotContains,
            "greater_than" | "gt" | ">" | "大于" => Self::GreaterThan,
            "less_than" | "lt" | "<" | "小于" => Self::LessThan,
            "greater_or_equal" | "ge" | ">=" | "大于等于" => Self::GreaterOrEqual,
            "less_or_equal" | "le" | "<=" | "小于等于" => Self::LessOrEqual,
            _ => return Err(EngineError::InvalidCondition(s.to_string())),
        };
        Ok(condition)
    }
}

/// An operator bound to its typed comparison value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(String),
    NotEquals(String),
    Contains(String),
    NotContains(String),
    GreaterThan(f64),
    LessThan(f64),
    GreaterOrEqual(f64),
    LessOrEqual(f64),
}

impl Predicate {
    /// Bind a comparison value. Ordering operators need a numeric value.
    pub fn new(condition: Condition, value: &str) -> EngineResult<Self> {
        if value.is_empty() {
            return Err(EngineError::invalid_parameter("value", "must not be empty"));
        }
        let number = || {
            parse_number(value).ok_or_else(|| {
                EngineError::invalid_parameter(
                    "value",
                    format!("'{}' is not a number, required by '{}'", value, condition),
                )
            })
        };
        Ok(match condition {
            Condition::Equals => Self::Equals(value.to_string()),
            Condition::NotEquals => Self::NotEquals(value.to_string()),
            Condition::Contains => Self::Contains(value.to_string()),
            Condition::NotContains => Self::NotContains(value.to_string()),
            Condition::GreaterThan => Self::GreaterThan(number()?),
            Condition::LessThan => Self::LessThan(number()?),
            Condition::GreaterOrEqual => Self::GreaterOrEqual(number()?),
            Condition::LessOrEqual => Self::LessOrEqual(number()?),
        })
    }

    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            Self::Equals(v) => cell.to_text() == *v,
            Self::NotEquals(v) => cell.to_text() != *v,
            Self::Contains(v) => cell.to_text().contains(v.as_str()),
            Self::NotContains(v) => !cell.to_text().contains(v.as_str()),
            Self::GreaterThan(v) => cell.as_number().is_some_and(|n| n > *v),
            Self::LessThan(v) => cell.as_number().is_some_and(|n| n < *v),
            Self::GreaterOrEqual(v) => cell.as_number().is_some_and(|n| n >= *v),
            Self::LessOrEqual(v) => cell.as_number().is_some_and(|n| n <= *v),
        }
    }
}

/// Outcome of filtering one file.
#[derive(Debug)]
pub(crate) enum FilterOutcome {
    /// The column exists; carries the matching rows (possibly none).
    Filtered { header: Vec<String>, part: Part },
    /// The column is absent; the file contributes nothing.
    MissingColumn,
}

/// Filter one labelled table.
pub(crate) fn filter_table(input: NamedTable, column: &str, predicate: &Predicate) -> FilterOutcome {
    let Some(index) = input.table.column_index(column) else {
        return FilterOutcome::MissingColumn;
    };
    let (header, mut rows) = input.table.into_parts();
    rows.retain(|row| predicate.matches(&row[index]));
    FilterOutcome::Filtered {
        header,
        part: Part {
            rows,
            tag: input.label,
        },
    }
}

/// Filter every table and concatenate the surviving rows in file-then-row
/// order, tagging each with its file name.
///
/// Tables lacking `column` are skipped. Columns are matched by name, so the
/// filter column may sit at a different position in each file; the header is
/// the union of the participating headers. Fails with [`EngineError::NoMatch`]
/// when no row survives.
pub fn filter_tables(
    inputs: Vec<NamedTable>,
    column: &str,
    predicate: &Predicate,
    source_column: &str,
) -> EngineResult<Table> {
    let mut parts = Vec::new();

    for input in inputs {
        let label = input.label.clone();
        match filter_table(input, column, predicate) {
            FilterOutcome::Filtered { header: columns, part } => {
                tracing::debug!(file = %label, matched = part.rows.len(), "Filtered file");
                parts.push((columns, part));
            }
            FilterOutcome::MissingColumn => {
                tracing::warn!(file = %label, column, "Skipping file without filter column");
            }
        }
    }

    let matched: usize = parts.iter().map(|(_, part)| part.rows.len()).sum();
    if matched == 0 {
        return Err(EngineError::NoMatch);
    }
    Ok(stack_by_name(parts, Some(source_column)))
}
