//! Typed cell values and the coercion rules shared by every operation.
//!
//! A cell is inferred once at read time and keeps its kind through every
//! transformation that doesn't explicitly coerce. Two derived views exist:
//!
//! - [`CellValue::to_text`] - the literal textual form, used by equality and
//!   containment predicates, CSV output and output file names.
//! - [`CellValue::as_number`] - numeric coercion for ordering predicates.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

/// Canonical decimal literal. Codes such as `007` or `+5` stay text.
static NUMBER_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("Hardcoded pattern")
});

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Largest integer an `f64` holds exactly. Longer integer literals (ID card
/// numbers, account numbers) stay text.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// One cell of a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Infers the kind of a raw delimited-text field.
    ///
    /// # Example
    /// ```
    /// use sheetbatch::CellValue;
    ///
    /// assert_eq!(CellValue::infer("30"), CellValue::Number(30.0));
    /// assert_eq!(CellValue::infer("007"), CellValue::Text("007".into()));
    /// assert_eq!(CellValue::infer("TRUE"), CellValue::Bool(true));
    /// assert_eq!(
    ///     CellValue::infer("110101199003074514"),
    ///     CellValue::Text("110101199003074514".into())
    /// );
    /// assert_eq!(CellValue::infer(""), CellValue::Empty);
    /// ```
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Empty;
        }
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if NUMBER_LITERAL.is_match(raw) {
            if let Ok(number) = raw.parse::<f64>() {
                let integer_literal = !raw.contains(['.', 'e', 'E']);
                if number.is_finite() && !(integer_literal && number.abs() > MAX_EXACT_INTEGER) {
                    return Self::Number(number);
                }
            }
        }
        Self::Text(raw.to_owned())
    }

    /// Text cell, or `Empty` for an empty string.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Literal textual form of the cell.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Numeric coercion for ordering comparisons. Non-numeric cells yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(value) => parse_number(value),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Date(value) => {
                if value.time() == NaiveTime::MIN {
                    write!(f, "{}", value.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.f"))
                }
            }
        }
    }
}

/// Parses a trimmed string as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Whole numbers print without a fraction, everything else in shortest
/// round-trip form.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("NaiveDate Literal")
        .and_time(NaiveTime::MIN)
}

/// 1900-system serial for a timestamp. Dates up to 1900-02-28 are shifted by
/// one day for the Lotus 1-2-3 leap year bug.
pub fn to_excel_serial(value: &NaiveDateTime) -> f64 {
    let midnight = value.date().and_time(NaiveTime::MIN);
    let mut days = (midnight - excel_epoch()).num_days();
    if days <= 60 {
        days -= 1;
    }
    let millis = value.time().num_seconds_from_midnight() as f64 * 1000.0
        + (value.time().nanosecond() / 1_000_000) as f64;
    days as f64 + millis / MILLIS_PER_DAY
}

/// Parses ISO 8601 date or datetime strings as stored by some writers.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
