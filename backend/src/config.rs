//! Engine configuration.
//!
//! Loaded once at process start and passed by reference into [`crate::Engine`].
//! Nothing in the engine reads the environment on its own.

use serde::{Deserialize, Serialize};
use std::env;

/// Default total input ceiling: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

const ENV_MAX_UPLOAD_MB: &str = "SHEETBATCH_MAX_UPLOAD_MB";
const ENV_ALLOWED_EXTENSIONS: &str = "SHEETBATCH_ALLOWED_EXTENSIONS";
const ENV_SOURCE_FILE_COLUMN: &str = "SHEETBATCH_SOURCE_FILE_COLUMN";
const ENV_SOURCE_SHEET_COLUMN: &str = "SHEETBATCH_SOURCE_SHEET_COLUMN";
const ENV_SHEET_NAME: &str = "SHEETBATCH_SHEET_NAME";

/// Immutable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ceiling on the summed size of all inputs of one invocation.
    pub max_upload_bytes: u64,
    /// Lower-case extensions accepted as input.
    pub allowed_extensions: Vec<String>,
    /// Header of the provenance column added by merge-files and filter-rows.
    pub source_file_column: String,
    /// Header of the provenance column added by merge-sheets.
    pub source_sheet_column: String,
    /// Worksheet name for single-sheet spreadsheet output.
    pub sheet_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["xlsx".into(), "xls".into(), "csv".into()],
            source_file_column: "SourceFile".into(),
            source_sheet_column: "SourceSheet".into(),
            sheet_name: "Sheet1".into(),
        }
    }
}

impl EngineConfig {
    /// Load `.env` (if present) then overlay `SHEETBATCH_*` variables on the defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_MAX_UPLOAD_MB) {
            match raw.trim().parse::<u64>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb.saturating_mul(1024 * 1024),
                _ => tracing::warn!(
                    key = ENV_MAX_UPLOAD_MB,
                    value = %raw,
                    "Ignoring invalid upload ceiling, keeping default"
                ),
            }
        }

        if let Some(raw) = get(ENV_ALLOWED_EXTENSIONS) {
            let extensions: Vec<String> = raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
            if extensions.is_empty() {
                tracing::warn!(key = ENV_ALLOWED_EXTENSIONS, "Empty extension list, keeping default");
            } else {
                config.allowed_extensions = extensions;
            }
        }

        if let Some(v) = get(ENV_SOURCE_FILE_COLUMN) {
            config.source_file_column = v;
        }
        if let Some(v) = get(ENV_SOURCE_SHEET_COLUMN) {
            config.source_sheet_column = v;
        }
        if let Some(v) = get(ENV_SHEET_NAME) {
            config.sheet_name = v;
        }

        config
    }

    /// Case-insensitive membership test for an extension (without the dot).
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}
