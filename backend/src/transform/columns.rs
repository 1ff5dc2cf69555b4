//! Column deletion.

use crate::error::{EngineError, EngineResult};
use crate::models::Table;

/// Split a comma-separated column list, trimming entries and dropping blanks.
pub fn parse_column_list(raw: &str) -> EngineResult<Vec<String>> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(EngineError::invalid_parameter(
            "columns",
            "no column names given",
        ));
    }
    Ok(names)
}

/// Remove every column whose name is requested. Names the table doesn't
/// have are ignored. Returns the names actually removed, in table order.
pub fn delete_columns(table: &mut Table, names: &[String]) -> Vec<String> {
    let indices: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| names.contains(column))
        .map(|(i, _)| i)
        .collect();
    let removed = indices.iter().map(|&i| table.columns()[i].clone()).collect();
    table.remove_columns(&indices);
    removed
}
