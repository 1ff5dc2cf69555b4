//! Domain models for the batch engine.
//!
//! This module contains the core data structures shared by readers, writers
//! and transforms:
//!
//! - [`CellValue`] - One typed cell (empty, text, number, boolean, date)
//! - [`Table`] - Header row plus data rows, always rectangular
//! - [`Sheet`] - A table with an optional sheet name
//! - [`Workbook`] - Ordered sheets decoded from one source file
//! - [`NamedTable`] - A table tagged with the label it will be emitted under

pub mod cell;

pub use cell::CellValue;

// =============================================================================
// Table
// =============================================================================

/// Rectangular grid: one header row of column names plus data rows.
///
/// Every row has exactly `columns().len()` cells. Short rows are padded with
/// [`CellValue::Empty`] and a long row widens the header with `""` names.
/// Duplicate column names are allowed; lookups by name resolve to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, normalizing every row to the common width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Build a table from physical rows where the first row is the header.
    ///
    /// Header cells are taken in their text form.
    pub fn from_physical_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows.remove(0);
        let columns = header.iter().map(CellValue::to_text).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<CellValue>>) {
        (self.columns, self.rows)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// No header and no data.
    pub fn is_blank(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Index of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or widening as needed.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() > self.columns.len() {
            self.widen(row.len());
        }
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Append a column at the right edge. `values` yields one cell per data row.
    pub fn push_column<F>(&mut self, name: impl Into<String>, mut values: F)
    where
        F: FnMut(usize) -> CellValue,
    {
        self.columns.push(name.into());
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.push(values(index));
        }
    }

    /// Drop every column whose index is in `indices`.
    pub fn remove_columns(&mut self, indices: &[usize]) {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|i| !indices.contains(&i))
            .collect();
        retain_by_mask(&mut self.columns, &keep);
        for row in &mut self.rows {
            retain_by_mask(row, &keep);
        }
    }

    /// Keep only the data rows matching the predicate.
    pub fn retain_rows<F>(&mut self, predicate: F)
    where
        F: FnMut(&Vec<CellValue>) -> bool,
    {
        self.rows.retain(predicate);
    }

    /// Apply `f` to every data cell. The header is never touched.
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut CellValue),
    {
        for cell in self.rows.iter_mut().flatten() {
            f(cell);
        }
    }

    /// Header as text cells, for writers that emit it as the first row.
    pub fn header_cells(&self) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|name| CellValue::Text(name.clone()))
            .collect()
    }

    fn widen(&mut self, width: usize) {
        self.columns.resize(width, String::new());
        for row in &mut self.rows {
            row.resize(width, CellValue::Empty);
        }
    }
}

fn retain_by_mask<T>(items: &mut Vec<T>, keep: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let kept = keep.get(index).copied().unwrap_or(true);
        index += 1;
        kept
    });
}

// =============================================================================
// Sheets and workbooks
// =============================================================================

/// One table, named when it came from a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: Option<String>,
    pub table: Table,
}

impl Sheet {
    pub fn named(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: Some(name.into()),
            table,
        }
    }

    pub fn unnamed(table: Table) -> Self {
        Self { name: None, table }
    }
}

/// Ordered sheets decoded from one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// First sheet's table, or an empty table for a workbook with no sheets.
    pub fn into_first_table(self) -> Table {
        self.sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.table)
            .unwrap_or_default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// A table together with the label it is emitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    pub label: String,
    pub table: Table,
}

impl NamedTable {
    pub fn new(label: impl Into<String>, table: Table) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}
