//! Output file naming.
//!
//! Every multi-output operation derives entry names from a partition key or
//! source file name plus one invocation timestamp.

use crate::models::CellValue;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters never allowed in an output name.
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\<>:"|?*\x00-\x1f\x7f]"#).expect("Hardcoded pattern"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Hardcoded pattern"));

/// Label used for partitions whose key cell is empty.
pub const BLANK_PARTITION: &str = "blank";

/// `YYYYMMDD_HHMMSS`, second granularity.
pub fn timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Sanitize a caller-supplied file name before it is embedded in an output name.
///
/// Path separators, reserved and control characters become `_`, whitespace
/// runs collapse to `_`, leading dots are dropped. Unicode letters survive.
///
/// # Example
/// ```
/// use sheetbatch::naming::secure_filename;
///
/// assert_eq!(secure_filename("../etc/passwd"), "_etc_passwd");
/// assert_eq!(secure_filename("销售 报表.xlsx"), "销售_报表.xlsx");
/// ```
pub fn secure_filename(name: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(name.trim(), "_");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, "_");
    let cleaned = collapsed.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Name fragment for a split-by-column partition key.
pub fn partition_label(value: &CellValue) -> String {
    if value.is_empty() {
        return BLANK_PARTITION.to_string();
    }
    value.to_text().replace(['/', '\\'], "_")
}

/// Replace (or add) the extension of a file name.
pub fn with_extension(name: &str, extension: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!("{}.{}", stem, extension),
        _ => format!("{}.{}", name, extension),
    }
}

/// Insert ` (n)` before the extension.
pub fn with_counter(name: &str, counter: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{} ({}).{}", stem, counter, ext)
        }
        _ => format!("{} ({})", name, counter),
    }
}
