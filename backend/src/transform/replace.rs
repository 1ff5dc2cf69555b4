//! Whole-value find and replace.
//!
//! A data cell matches when its text form equals the search text exactly.
//! Substrings inside longer values are left alone and the header row is
//! never touched.

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, NamedTable, Table};

/// Validated search and replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSpec {
    find: String,
    replace: String,
}

impl ReplaceSpec {
    /// Both texts are trimmed; the search text must not be empty.
    pub fn new(find: &str, replace: &str) -> EngineResult<Self> {
        let find = find.trim();
        if find.is_empty() {
            return Err(EngineError::invalid_parameter("find_text", "must not be empty"));
        }
        Ok(Self {
            find: find.to_string(),
            replace: replace.trim().to_string(),
        })
    }

    pub fn find(&self) -> &str {
        &self.find
    }

    pub fn replacement(&self) -> CellValue {
        CellValue::text(self.replace.as_str())
    }
}

/// Replace matching cells in place. Returns the number of replaced cells.
pub fn find_replace(table: &mut Table, spec: &ReplaceSpec) -> usize {
    let mut replaced = 0;
    table.map_cells(|cell| {
        if !cell.is_empty() && cell.to_text() == spec.find {
            *cell = spec.replacement();
            replaced += 1;
        }
    });
    replaced
}

/// Apply [`find_replace`] to every sheet, keeping names and order.
pub fn find_replace_sheets(sheets: Vec<NamedTable>, spec: &ReplaceSpec) -> (Vec<NamedTable>, usize) {
    let mut total = 0;
    let sheets = sheets
        .into_iter()
        .map(|mut sheet| {
            total += find_replace(&mut sheet.table, spec);
            sheet
        })
        .collect();
    (sheets, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn sample() -> Table {
        Table::new(
            vec!["Status".into(), "Code".into()],
            vec![
                vec![text("old"), CellValue::Number(30.0)],
                vec![text("golden"), text("old")],
                vec![CellValue::Empty, CellValue::Bool(true)],
            ],
        )
    }

    #[test]
    fn test_whole_value_only() {
        let mut table = sample();
        let count = find_replace(&mut table, &ReplaceSpec::new("old", "new").unwrap());

        assert_eq!(count, 2);
        assert_eq!(table.rows()[0][0], text("new"));
        assert_eq!(table.rows()[1][0], text("golden"));
        assert_eq!(table.rows()[1][1], text("new"));
    }

    #[test]
    fn test_matches_on_text_form() {
        let mut table = sample();
        find_replace(&mut table, &ReplaceSpec::new("30", "thirty").unwrap());
        assert_eq!(table.rows()[0][1], text("thirty"));

        find_replace(&mut table, &ReplaceSpec::new("True", "yes").unwrap());
        assert_eq!(table.rows()[2][1], text("yes"));
    }

    #[test]
    fn test_empty_replacement_clears_cell() {
        let mut table = sample();
        find_replace(&mut table, &ReplaceSpec::new(" old ", "  ").unwrap());
        assert_eq!(table.rows()[0][0], CellValue::Empty);
    }

    #[test]
    fn test_header_untouched() {
        let mut table = sample();
        find_replace(&mut table, &ReplaceSpec::new("Status", "x").unwrap());
        assert_eq!(table.columns()[0], "Status");
    }

    #[test]
    fn test_empty_find_text_rejected() {
        assert!(matches!(
            ReplaceSpec::new("   ", "x"),
            Err(EngineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_sheets_keep_order() {
        let (sheets, total) = find_replace_sheets(
            vec![NamedTable::new("B", sample()), NamedTable::new("A", sample())],
            &ReplaceSpec::new("old", "new").unwrap(),
        );
        assert_eq!(total, 4);
        assert_eq!(sheets[0].label, "B");
        assert_eq!(sheets[1].label, "A");
    }
}
