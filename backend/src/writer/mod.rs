//! Table writer: encodes tables back into bytes.
//!
//! - [`csv`] - UTF-8 with a byte-order mark, header first.
//! - [`xlsx`] - Office Open XML workbook, values written with native types.

pub mod csv;
pub mod xlsx;

use crate::error::EngineResult;
use crate::models::Table;
use crate::parser::FileFormat;

/// Media type of an `.xlsx` workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Media type of BOM-prefixed UTF-8 delimited text.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Media type of a bundle archive.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Csv,
    Xlsx,
}

impl TargetFormat {
    /// Spreadsheet sources are always written back as `.xlsx`.
    pub fn for_source(format: FileFormat) -> Self {
        match format {
            FileFormat::Csv => Self::Csv,
            FileFormat::Xlsx | FileFormat::Xls => Self::Xlsx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => CSV_CONTENT_TYPE,
            Self::Xlsx => XLSX_CONTENT_TYPE,
        }
    }
}

/// Encode one table. `sheet_name` is only used for spreadsheet output.
pub fn write_table(table: &Table, format: TargetFormat, sheet_name: &str) -> EngineResult<Vec<u8>> {
    match format {
        TargetFormat::Csv => csv::write_csv(table),
        TargetFormat::Xlsx => xlsx::write_xlsx(table, sheet_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    #[test]
    fn test_xls_sources_become_xlsx() {
        assert_eq!(TargetFormat::for_source(FileFormat::Xls), TargetFormat::Xlsx);
        assert_eq!(TargetFormat::for_source(FileFormat::Csv).extension(), "csv");
        assert_eq!(TargetFormat::Xlsx.content_type(), XLSX_CONTENT_TYPE);
    }

    #[test]
    fn test_write_table_dispatches_on_format() {
        let table = Table::new(vec!["a".into()], vec![vec![CellValue::Number(1.0)]]);

        let csv = write_table(&table, TargetFormat::Csv, "ignored").unwrap();
        assert!(csv.starts_with(&[0xEF, 0xBB, 0xBF]));

        let xlsx = write_table(&table, TargetFormat::Xlsx, "Sheet1").unwrap();
        assert!(xlsx.starts_with(b"PK"));
    }
}
