//! Merge files and merge sheets.
//!
//! Both are positional concatenations: no column-name alignment happens
//! across inputs, so callers are expected to merge tables sharing one layout.
//! Ragged inputs are padded to the widest one.

use super::{stack, Part};
use crate::error::{EngineError, EngineResult};
use crate::models::NamedTable;
use crate::models::Table;

/// Flags for [`merge_tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Drop the header row of every input after the first. When off, later
    /// headers are kept as ordinary data rows.
    pub keep_headers: bool,
    /// Append a column naming the originating file.
    pub add_source_column: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            keep_headers: true,
            add_source_column: false,
        }
    }
}

/// Concatenate the tables of several files, in input order.
///
/// Each input is labelled with its file name, used for the provenance column.
pub fn merge_tables(inputs: Vec<NamedTable>, options: MergeOptions, source_column: &str) -> Table {
    let mut inputs = inputs.into_iter();
    let Some(first) = inputs.next() else {
        return Table::default();
    };

    let (header, first_rows) = first.table.into_parts();
    let mut parts = vec![Part {
        rows: first_rows,
        tag: first.label,
    }];

    for input in inputs {
        let header_row = input.table.header_cells();
        let (_, data) = input.table.into_parts();
        let mut rows = Vec::with_capacity(data.len() + 1);
        if !options.keep_headers {
            rows.push(header_row);
        }
        rows.extend(data);
        parts.push(Part {
            rows,
            tag: input.label,
        });
    }

    let tag_column = options.add_source_column.then_some(source_column);
    stack(header, parts, tag_column)
}

/// Flatten every sheet of one workbook into a single table, in sheet order.
///
/// The header comes from the first sheet that has one; headers of later
/// sheets are dropped. Each sheet is labelled with its name.
pub fn merge_sheets(
    sheets: Vec<NamedTable>,
    add_sheet_column: bool,
    sheet_column: &str,
) -> EngineResult<Table> {
    let mut header = None;
    let mut parts = Vec::new();

    for sheet in sheets {
        if sheet.table.is_blank() {
            tracing::debug!(sheet = %sheet.label, "Skipping empty sheet");
            continue;
        }
        let (columns, rows) = sheet.table.into_parts();
        if header.is_none() {
            header = Some(columns);
        }
        parts.push(Part {
            rows,
            tag: sheet.label,
        });
    }

    let header = header.ok_or_else(|| EngineError::NoValidInput("every sheet is empty".into()))?;
    Ok(stack(header, parts, add_sheet_column.then_some(sheet_column)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| CellValue::infer(v)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_merge_with_source_column() {
        let merged = merge_tables(
            vec![
                NamedTable::new("a.xlsx", table(&["Name", "Dept"], &[&["Zhang", "Sales"]])),
                NamedTable::new("b.xlsx", table(&["Name", "Dept"], &[&["Li", "Tech"]])),
            ],
            MergeOptions {
                keep_headers: true,
                add_source_column: true,
            },
            "SourceFile",
        );

        assert_eq!(
            merged.columns(),
            &["Name".to_string(), "Dept".to_string(), "SourceFile".to_string()]
        );
        assert_eq!(merged.rows()[0], vec![text("Zhang"), text("Sales"), text("a.xlsx")]);
        assert_eq!(merged.rows()[1], vec![text("Li"), text("Tech"), text("b.xlsx")]);
    }

    #[test]
    fn test_keep_headers_counts_header_once() {
        let merged = merge_tables(
            vec![
                NamedTable::new("a", table(&["x"], &[&["1"], &["2"]])),
                NamedTable::new("b", table(&["x"], &[&["3"]])),
            ],
            MergeOptions::default(),
            "SourceFile",
        );
        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.width(), 1);
    }

    #[test]
    fn test_without_keep_headers_later_headers_become_data() {
        let merged = merge_tables(
            vec![
                NamedTable::new("a", table(&["x"], &[&["1"]])),
                NamedTable::new("b", table(&["x"], &[&["2"]])),
            ],
            MergeOptions {
                keep_headers: false,
                add_source_column: true,
            },
            "SourceFile",
        );

        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.rows()[1], vec![text("x"), text("b")]);
        assert_eq!(merged.rows()[2], vec![CellValue::Number(2.0), text("b")]);
    }

    #[test]
    fn test_merge_of_ragged_tables_is_positional() {
        let merged = merge_tables(
            vec![
                NamedTable::new("a", table(&["x", "y"], &[&["1", "2"]])),
                NamedTable::new("b", table(&["z"], &[&["3"]])),
            ],
            MergeOptions::default(),
            "SourceFile",
        );

        assert_eq!(merged.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(merged.rows()[1], vec![CellValue::Number(3.0), CellValue::Empty]);
    }

    #[test]
    fn test_merge_sheets_drops_later_headers() {
        let merged = merge_sheets(
            vec![
                NamedTable::new("Jan", table(&["Item", "Qty"], &[&["pen", "2"]])),
                NamedTable::new("Feb", table(&["Item", "Qty"], &[&["ink", "5"], &["pad", "1"]])),
            ],
            true,
            "SourceSheet",
        )
        .unwrap();

        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.columns()[2], "SourceSheet");
        assert_eq!(merged.rows()[0][2], text("Jan"));
        assert_eq!(merged.rows()[2][2], text("Feb"));
    }

    #[test]
    fn test_merge_sheets_header_from_first_non_empty_sheet() {
        let merged = merge_sheets(
            vec![
                NamedTable::new("Cover", Table::default()),
                NamedTable::new("Data", table(&["k"], &[&["v"]])),
            ],
            false,
            "SourceSheet",
        )
        .unwrap();

        assert_eq!(merged.columns(), &["k".to_string()]);
        assert_eq!(merged.row_count(), 1);
    }

    #[test]
    fn test_merge_sheets_all_empty() {
        let err = merge_sheets(vec![NamedTable::new("S", Table::default())], false, "SourceSheet").unwrap_err();
        assert!(matches!(err, EngineError::NoValidInput(_)));
    }
}
