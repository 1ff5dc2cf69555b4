//! Delimited-text output.

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, Table};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Write a table as comma-separated UTF-8 with a leading byte-order mark.
///
/// Cells are rendered in their text form, so numbers never pick up a
/// locale-dependent separator.
pub fn write_csv(table: &Table) -> EngineResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec());

    if table.width() > 0 {
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(CellValue::to_text))?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| EngineError::Encode(e.error().to_string()))
}
