//! Spreadsheet decoding (`.xlsx`, `.xls`) through calamine.
//!
//! The decoded workbook handle lives only inside [`read_spreadsheet`]; it is
//! dropped once every sheet has been read, whether or not a sheet fails.

use crate::error::{SourceError, SourceResult};
use crate::models::cell::parse_iso_datetime;
use crate::models::{CellValue, Sheet, Table, Workbook};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// Decode every worksheet, in native order.
pub fn read_spreadsheet(file: &str, bytes: &[u8]) -> SourceResult<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SourceError::decode(file, e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SourceError::decode(file, format!("sheet '{}': {}", name, e)))?;
        let table = range_to_table(&range);
        tracing::debug!(
            file,
            sheet = %name,
            columns = table.width(),
            rows = table.row_count(),
            "Read worksheet"
        );
        sheets.push(Sheet::named(name, table));
    }

    Ok(Workbook::new(sheets))
}

/// Convert a used range into a table. Columns left of the used range are
/// kept as empty columns so positions stay absolute.
fn range_to_table(range: &Range<Data>) -> Table {
    if range.is_empty() {
        return Table::default();
    }
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let rows = range
        .rows()
        .map(|row| {
            let mut cells = vec![CellValue::Empty; offset];
            cells.extend(row.iter().map(convert_cell));
            cells
        })
        .collect();

    Table::from_physical_rows(rows)
}

/// Map one calamine cell onto the engine's cell model.
pub fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(value) => CellValue::text(value.as_str()),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        // `as_datetime` follows the workbook's 1900 or 1904 date system.
        Data::DateTime(value) if value.is_datetime() => value
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(value.as_f64())),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::DateTimeIso(value) => parse_iso_datetime(value)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::text(value.as_str())),
        Data::DurationIso(value) => CellValue::text(value.as_str()),
        Data::Error(code) => CellValue::Text(code.to_string()),
    }
}
