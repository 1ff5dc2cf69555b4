//! Format conversion between spreadsheets and delimited text.

use crate::error::EngineError;
use crate::models::{NamedTable, Workbook};
use crate::naming::secure_filename;
use crate::parser::FileFormat;
use crate::writer::TargetFormat;
use std::str::FromStr;

/// Direction of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertDirection {
    /// Every sheet becomes its own `.csv`.
    XlsxToCsv,
    /// Each delimited file becomes a single-sheet `.xlsx`.
    CsvToXlsx,
}

impl ConvertDirection {
    /// Whether a source of this format takes part in the conversion.
    pub fn accepts(&self, format: FileFormat) -> bool {
        match self {
            Self::XlsxToCsv => format.is_spreadsheet(),
            Self::CsvToXlsx => format == FileFormat::Csv,
        }
    }

    pub fn target(&self) -> TargetFormat {
        match self {
            Self::XlsxToCsv => TargetFormat::Csv,
            Self::CsvToXlsx => TargetFormat::Xlsx,
        }
    }
}

impl FromStr for ConvertDirection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "xlsx_to_csv" => Ok(Self::XlsxToCsv),
            "csv_to_xlsx" => Ok(Self::CsvToXlsx),
            _ => Err(EngineError::invalid_parameter(
                "direction",
                format!("'{}' is not one of xlsx_to_csv, csv_to_xlsx", s),
            )),
        }
    }
}

/// Split a workbook into the outputs of one conversion.
///
/// Labels are `<base>_<sheet>` for spreadsheet sources and `<base>` for
/// delimited ones; the caller adds the extension.
pub fn convert_workbook(
    base: &str,
    workbook: Workbook,
    direction: ConvertDirection,
    default_sheet: &str,
) -> Vec<NamedTable> {
    match direction {
        ConvertDirection::XlsxToCsv => workbook
            .sheets
            .into_iter()
            .map(|sheet| {
                let sheet_name = sheet.name.as_deref().unwrap_or(default_sheet);
                NamedTable::new(secure_filename(&format!("{}_{}", base, sheet_name)), sheet.table)
            })
            .collect(),
        ConvertDirection::CsvToXlsx => {
            vec![NamedTable::new(secure_filename(base), workbook.into_first_table())]
        }
    }
}
