//! Table-level transformations.
//!
//! Every function here is pure: tables in, tables out. Reading, naming and
//! encoding are handled by [`crate::engine`].
//!
//! - [`merge`] - Merge files and merge sheets (positional concatenation)
//! - [`split`] - Partition by column value or by row count
//! - [`replace`] - Whole-value find and replace
//! - [`columns`] - Column deletion
//! - [`filter`] - Typed row predicates, name-aligned concatenation
//! - [`convert`] - Conversion direction and per-sheet outputs

pub mod columns;
pub mod convert;
pub mod filter;
pub mod merge;
pub mod replace;
pub mod split;

pub use columns::{delete_columns, parse_column_list};
pub use convert::{convert_workbook, ConvertDirection};
pub use filter::{filter_tables, Condition, Predicate};
pub use merge::{merge_sheets, merge_tables, MergeOptions};
pub use replace::{find_replace, find_replace_sheets, ReplaceSpec};
pub use split::{parse_rows_per_file, split_by_column, split_by_rows};

use crate::models::{CellValue, Table};
use std::collections::HashMap;

/// Rows contributed by one input, with the tag written into the provenance column.
#[derive(Debug)]
pub(crate) struct Part {
    pub rows: Vec<Vec<CellValue>>,
    pub tag: String,
}

/// Concatenate parts positionally under `header`.
///
/// Every row is padded to the widest input first, so an appended tag column
/// always lands in the same position.
pub(crate) fn stack(mut header: Vec<String>, parts: Vec<Part>, tag_column: Option<&str>) -> Table {
    let width = parts
        .iter()
        .flat_map(|part| part.rows.iter().map(Vec::len))
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    header.resize(width, String::new());
    if let Some(name) = tag_column {
        header.push(name.to_string());
    }

    let mut rows = Vec::new();
    for part in parts {
        for mut row in part.rows {
            row.resize(width, CellValue::Empty);
            if tag_column.is_some() {
                row.push(CellValue::Text(part.tag.clone()));
            }
            rows.push(row);
        }
    }

    Table::new(header, rows)
}

/// Concatenate parts by column name.
///
/// The output header is the union of every input header in first-seen
/// order. A name repeated within one header matches the same occurrence in
/// the others. Cells for columns an input lacks stay empty.
pub(crate) fn stack_by_name(parts: Vec<(Vec<String>, Part)>, tag_column: Option<&str>) -> Table {
    let mut header: Vec<String> = Vec::new();
    let mut positions: HashMap<(String, usize), usize> = HashMap::new();

    let mut layouts = Vec::with_capacity(parts.len());
    for (columns, part) in parts {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let layout: Vec<usize> = columns
            .iter()
            .map(|name| {
                let occurrence = seen.entry(name.as_str()).or_insert(0);
                let key = (name.clone(), *occurrence);
                *occurrence += 1;
                *positions.entry(key).or_insert_with(|| {
                    header.push(name.clone());
                    header.len() - 1
                })
            })
            .collect();
        layouts.push((layout, part));
    }

    let width = header.len();
    if let Some(name) = tag_column {
        header.push(name.to_string());
    }

    let mut rows = Vec::new();
    for (layout, part) in layouts {
        for row in part.rows {
            let mut aligned = vec![CellValue::Empty; width];
            for (cell, &target) in row.into_iter().zip(&layout) {
                aligned[target] = cell;
            }
            if tag_column.is_some() {
                aligned.push(CellValue::Text(part.tag.clone()));
            }
            rows.push(aligned);
        }
    }

    Table::new(header, rows)
}
