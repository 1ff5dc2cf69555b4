//! Source reader: decodes caller-supplied bytes into a [`Workbook`].
//!
//! - Delimited text ([`csv`]) gives one unnamed sheet, with encoding and
//!   delimiter auto-detection.
//! - Spreadsheets ([`spreadsheet`]) give one named sheet per worksheet, in
//!   the workbook's native order.
//!
//! Failures are per-file [`SourceError`]s; batch operations decide whether to
//! skip the file or abort.

pub mod csv;
pub mod spreadsheet;

use crate::config::EngineConfig;
use crate::error::{SourceError, SourceResult};
use crate::models::{Table, Workbook};
use std::path::Path;

pub use self::csv::{decode_content, detect_delimiter, detect_encoding};

/// Input formats the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Format for a lower- or upper-case extension without the dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls)
    }
}

/// One input file: original name plus raw content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Lower-case extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Name without its extension.
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
            _ => &self.name,
        }
    }

    pub fn format(&self) -> Option<FileFormat> {
        self.extension().as_deref().and_then(FileFormat::from_extension)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Resolve the format of a file against the allowed extension set.
pub fn resolve_format(file: &SourceFile, config: &EngineConfig) -> SourceResult<FileFormat> {
    let unsupported = || SourceError::UnsupportedFormat {
        file: file.name.clone(),
    };
    let extension = file.extension().ok_or_else(unsupported)?;
    if !config.allows_extension(&extension) {
        return Err(unsupported());
    }
    FileFormat::from_extension(&extension).ok_or_else(unsupported)
}

/// Decode a file into a workbook.
pub fn read_workbook(file: &SourceFile, config: &EngineConfig) -> SourceResult<Workbook> {
    let format = resolve_format(file, config)?;
    let workbook = match format {
        FileFormat::Csv => csv::read_csv(&file.name, &file.bytes)?,
        FileFormat::Xlsx | FileFormat::Xls => spreadsheet::read_spreadsheet(&file.name, &file.bytes)?,
    };
    tracing::debug!(
        file = %file.name,
        sheets = workbook.sheet_count(),
        "Decoded source file"
    );
    Ok(workbook)
}

/// Decode a file and keep only its first sheet.
pub fn read_first_table(file: &SourceFile, config: &EngineConfig) -> SourceResult<Table> {
    read_workbook(file, config).map(Workbook::into_first_table)
}
