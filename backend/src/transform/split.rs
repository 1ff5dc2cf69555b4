//! Partitioning: by the value of one column, or by a fixed row count.

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, NamedTable, Table};
use crate::naming::partition_label;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Hashable identity of a cell. Kinds stay distinct: `Number(1)` and
/// `Text("1")` are different partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PartitionKey {
    Empty,
    Text(String),
    Number(u64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl From<&CellValue> for PartitionKey {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => Self::Empty,
            CellValue::Text(s) => Self::Text(s.clone()),
            // -0.0 and 0.0 share a partition
            CellValue::Number(n) => Self::Number(if *n == 0.0 { 0 } else { n.to_bits() }),
            CellValue::Bool(b) => Self::Bool(*b),
            CellValue::Date(d) => Self::Date(*d),
        }
    }
}

/// Partition data rows by the exact value of `column`, in first-seen order.
///
/// Each output carries the full header and is labelled with the sanitized
/// partition value (`blank` for empty cells). A table without data rows
/// yields no partitions.
pub fn split_by_column(table: &Table, column: &str) -> EngineResult<Vec<NamedTable>> {
    let index = table
        .column_index(column)
        .ok_or_else(|| EngineError::ColumnNotFound(column.to_string()))?;

    let mut positions: HashMap<PartitionKey, usize> = HashMap::new();
    let mut partitions: Vec<(String, Vec<Vec<CellValue>>)> = Vec::new();

    for row in table.rows() {
        let value = &row[index];
        let slot = *positions.entry(PartitionKey::from(value)).or_insert_with(|| {
            partitions.push((partition_label(value), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(row.clone());
    }

    Ok(partitions
        .into_iter()
        .map(|(label, rows)| NamedTable::new(label, Table::new(table.columns().to_vec(), rows)))
        .collect())
}

/// Parse a row-count parameter as a positive integer.
pub fn parse_rows_per_file(raw: &str) -> EngineResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EngineError::invalid_parameter(
            "rows_per_file",
            format!("'{}' is not a positive integer", raw),
        )),
    }
}

/// Cut data rows into consecutive chunks of at most `rows_per_file`.
///
/// Chunks are labelled `part_1`, `part_2`, ... and each repeats the header.
/// A table without data rows yields no chunks.
pub fn split_by_rows(table: &Table, rows_per_file: usize) -> EngineResult<Vec<NamedTable>> {
    if rows_per_file == 0 {
        return Err(EngineError::invalid_parameter(
            "rows_per_file",
            "must be a positive integer",
        ));
    }

    Ok(table
        .rows()
        .chunks(rows_per_file)
        .enumerate()
        .map(|(i, chunk)| {
            NamedTable::new(
                format!("part_{}", i + 1),
                Table::new(table.columns().to_vec(), chunk.to_vec()),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new(
            vec!["Name".into(), "Dept".into()],
            vec![
                vec![CellValue::Text("Ann".into()), CellValue::Text("Sales".into())],
                vec![CellValue::Text("Bo".into()), CellValue::Text("R/D".into())],
                vec![CellValue::Text("Cy".into()), CellValue::Text("Sales".into())],
                vec![CellValue::Text("Di".into()), CellValue::Empty],
                vec![CellValue::Text("Ed".into()), CellValue::Number(7.0)],
                vec![CellValue::Text("Fi".into()), CellValue::Text("7".into())],
            ],
        )
    }

    #[test]
    fn test_split_by_column_first_seen_order() {
        let parts = split_by_column(&people(), "Dept").unwrap();
        let labels: Vec<_> = parts.iter().map(|p| p.label.as_str()).collect();

        assert_eq!(labels, vec!["Sales", "R_D", "blank", "7", "7"]);
        assert_eq!(parts[0].table.row_count(), 2);
        assert_eq!(parts[0].table.columns(), people().columns());
    }

    #[test]
    fn test_split_by_column_covers_every_row_once() {
        let table = people();
        let parts = split_by_column(&table, "Dept").unwrap();

        let total: usize = parts.iter().map(|p| p.table.row_count()).sum();
        assert_eq!(total, table.row_count());
        for part in &parts {
            let first = &part.table.rows()[0][1];
            assert!(part.table.rows().iter().all(|row| &row[1] == first));
        }
    }

    #[test]
    fn test_split_by_missing_column() {
        let err = split_by_column(&people(), "Region").unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound(ref c) if c == "Region"));
    }

    #[test]
    fn test_split_header_only_table() {
        let table = Table::new(vec!["Dept".into()], Vec::new());
        assert!(split_by_column(&table, "Dept").unwrap().is_empty());
        assert!(split_by_rows(&table, 2).unwrap().is_empty());
        assert!(matches!(
            split_by_column(&table, "Region"),
            Err(EngineError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_split_by_rows_chunks() {
        let table = people();
        let parts = split_by_rows(&table, 4).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].label, "part_1");
        assert_eq!(parts[0].table.row_count(), 4);
        assert_eq!(parts[1].table.row_count(), 2);

        let rejoined: Vec<_> = parts.iter().flat_map(|p| p.table.rows().to_vec()).collect();
        assert_eq!(rejoined, table.rows().to_vec());
    }

    #[test]
    fn test_split_by_rows_rejects_zero() {
        assert!(matches!(
            split_by_rows(&people(), 0),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_parse_rows_per_file() {
        assert_eq!(parse_rows_per_file(" 50 ").unwrap(), 50);
        assert!(parse_rows_per_file("0").is_err());
        assert!(parse_rows_per_file("-3").is_err());
        assert!(parse_rows_per_file("2.5").is_err());
        assert!(parse_rows_per_file("many").is_err());
    }
}
