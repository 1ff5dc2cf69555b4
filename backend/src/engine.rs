//! Engine entry points: one method per batch operation.
//!
//! Each call reads the supplied files, runs a pure transform from
//! [`crate::transform`], and encodes the result as a single [`OutputFile`]:
//! either one table or a zip bundle of several.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetbatch::{Engine, EngineConfig, MergeOptions, SourceFile};
//!
//! let config = EngineConfig::from_env();
//! let files = vec![
//!     SourceFile::from_path("north.xlsx")?,
//!     SourceFile::from_path("south.csv")?,
//! ];
//! let output = Engine::new(&config).merge_files(&files, MergeOptions::default())?;
//! std::fs::write(&output.file_name, &output.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use chrono::{Local, NaiveDateTime};

use crate::bundle::Bundle;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, SourceResult};
use crate::models::{NamedTable, Table, Workbook};
use crate::naming::{secure_filename, timestamp, with_extension};
use crate::parser::{read_first_table, read_workbook, resolve_format, SourceFile};
use crate::transform::{
    convert_workbook, delete_columns, filter_tables, find_replace_sheets, merge_sheets,
    merge_tables, parse_column_list, split_by_column, split_by_rows, Condition, ConvertDirection,
    MergeOptions, Predicate, ReplaceSpec,
};
use crate::writer::xlsx::{write_workbook, write_xlsx};
use crate::writer::{write_table, TargetFormat, XLSX_CONTENT_TYPE, ZIP_CONTENT_TYPE};

// =============================================================================
// Output descriptor
// =============================================================================

/// One encoded result, ready to be written to disk or streamed.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl OutputFile {
    fn xlsx(file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        }
    }

    fn bundle(file_name: String, bundle: Bundle) -> EngineResult<Self> {
        Ok(Self {
            file_name,
            content_type: ZIP_CONTENT_TYPE,
            bytes: bundle.into_zip()?,
        })
    }
}

// =============================================================================
// Per-file outcomes
// =============================================================================

/// Result of preparing one file of a batch.
#[derive(Debug)]
pub enum FileOutcome<T> {
    Ready { file: String, value: T },
    Skipped { file: String, reason: String },
}

impl<T> FileOutcome<T> {
    fn from_result(file: &SourceFile, result: SourceResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ready {
                file: file.name.clone(),
                value,
            },
            Err(e) => Self::Skipped {
                file: file.name.clone(),
                reason: e.to_string(),
            },
        }
    }

    fn skipped(file: &SourceFile, reason: impl Into<String>) -> Self {
        Self::Skipped {
            file: file.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Log skipped files and keep the ready ones, in input order.
fn collect_ready<T>(operation: &str, outcomes: Vec<FileOutcome<T>>) -> Vec<(String, T)> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            FileOutcome::Ready { file, value } => Some((file, value)),
            FileOutcome::Skipped { file, reason } => {
                tracing::warn!(operation, file = %file, reason = %reason, "Skipping file");
                None
            }
        })
        .collect()
}

// =============================================================================
// Engine
// =============================================================================

/// Batch operations over tabular files.
#[derive(Debug, Clone)]
pub struct Engine<'a> {
    config: &'a EngineConfig,
    at: Option<NaiveDateTime>,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config, at: None }
    }

    /// Freeze the clock used for output names.
    pub fn at(mut self, at: NaiveDateTime) -> Self {
        self.at = Some(at);
        self
    }

    fn stamp(&self) -> String {
        timestamp(&self.at.unwrap_or_else(|| Local::now().naive_local()))
    }

    fn check_size(&self, files: &[SourceFile]) -> EngineResult<()> {
        let actual: u64 = files.iter().map(SourceFile::size).sum();
        let limit = self.config.max_upload_bytes;
        if actual > limit {
            return Err(EngineError::PayloadTooLarge { actual, limit });
        }
        Ok(())
    }

    fn check_batch(&self, files: &[SourceFile]) -> EngineResult<()> {
        if files.is_empty() {
            return Err(EngineError::NoValidInput("no files were supplied".into()));
        }
        self.check_size(files)
    }

    fn sheet_label(&self, name: Option<String>) -> String {
        name.unwrap_or_else(|| self.config.sheet_name.clone())
    }

    /// Read the first sheet of every file, skipping unreadable and empty ones.
    fn read_first_tables(&self, operation: &str, files: &[SourceFile]) -> Vec<(String, Table)> {
        let outcomes = files
            .iter()
            .map(|file| match read_first_table(file, self.config) {
                Ok(table) if table.is_blank() => FileOutcome::skipped(file, "file has no data"),
                result => FileOutcome::from_result(file, result),
            })
            .collect();
        collect_ready(operation, outcomes)
    }

    // -------------------------------------------------------------------------
    // Merging
    // -------------------------------------------------------------------------

    /// Concatenate the first sheet of every file into one workbook.
    pub fn merge_files(&self, files: &[SourceFile], options: MergeOptions) -> EngineResult<OutputFile> {
        self.check_batch(files)?;
        let stamp = self.stamp();
        tracing::info!(files = files.len(), ?options, "Merging files");

        let inputs: Vec<NamedTable> = self
            .read_first_tables("merge_files", files)
            .into_iter()
            .map(|(file, table)| NamedTable::new(file, table))
            .collect();
        if inputs.is_empty() {
            return Err(EngineError::NoValidInput("none of the files could be read".into()));
        }

        let merged = merge_tables(inputs, options, &self.config.source_file_column);
        tracing::info!(rows = merged.row_count(), "Merged files");

        let bytes = write_xlsx(&merged, &self.config.sheet_name)?;
        Ok(OutputFile::xlsx(format!("merged_{}.xlsx", stamp), bytes))
    }

    /// Flatten every sheet of one workbook into a single sheet.
    pub fn merge_sheets(&self, file: &SourceFile, add_sheet_column: bool) -> EngineResult<OutputFile> {
        self.check_size(std::slice::from_ref(file))?;
        let stamp = self.stamp();
        tracing::info!(file = %file.name, add_sheet_column, "Merging sheets");

        let workbook = read_workbook(file, self.config)?;
        let sheets = workbook
            .sheets
            .into_iter()
            .map(|sheet| NamedTable::new(self.sheet_label(sheet.name), sheet.table))
            .collect();
        let merged = merge_sheets(sheets, add_sheet_column, &self.config.source_sheet_column)?;
        tracing::info!(rows = merged.row_count(), "Merged sheets");

        let bytes = write_xlsx(&merged, &self.config.sheet_name)?;
        Ok(OutputFile::xlsx(format!("merged_sheets_{}.xlsx", stamp), bytes))
    }

    // -------------------------------------------------------------------------
    // Splitting
    // -------------------------------------------------------------------------

    /// One workbook per distinct value of `column`, bundled.
    pub fn split_by_column(&self, file: &SourceFile, column: &str) -> EngineResult<OutputFile> {
        let column = column.trim();
        if column.is_empty() {
            return Err(EngineError::invalid_parameter("column", "must not be empty"));
        }
        self.check_size(std::slice::from_ref(file))?;
        let stamp = self.stamp();
        tracing::info!(file = %file.name, column, "Splitting by column");

        let table = read_first_table(file, self.config)?;
        let partitions = split_by_column(&table, column)?;
        self.bundle_partitions("split_by_column", &stamp, partitions)
    }

    /// Consecutive chunks of at most `rows_per_file` data rows, bundled.
    pub fn split_by_rows(&self, file: &SourceFile, rows_per_file: usize) -> EngineResult<OutputFile> {
        if rows_per_file == 0 {
            return Err(EngineError::invalid_parameter(
                "rows_per_file",
                "must be a positive integer",
            ));
        }
        self.check_size(std::slice::from_ref(file))?;
        let stamp = self.stamp();
        tracing::info!(file = %file.name, rows_per_file, "Splitting by rows");

        let table = read_first_table(file, self.config)?;
        let chunks = split_by_rows(&table, rows_per_file)?;
        self.bundle_partitions("split_by_rows", &stamp, chunks)
    }

    fn bundle_partitions(
        &self,
        operation: &str,
        stamp: &str,
        partitions: Vec<NamedTable>,
    ) -> EngineResult<OutputFile> {
        let mut bundle = Bundle::new();
        for partition in partitions {
            let bytes = write_xlsx(&partition.table, &self.config.sheet_name)?;
            let name = bundle.add(format!("{}_{}.xlsx", partition.label, stamp), bytes);
            tracing::debug!(entry = %name, rows = partition.table.row_count(), "Added partition");
        }
        tracing::info!(operation, entries = bundle.len(), "Built bundle");
        OutputFile::bundle(format!("{}_{}.zip", operation, stamp), bundle)
    }

    // -------------------------------------------------------------------------
    // Per-file rewrites
    // -------------------------------------------------------------------------

    /// Replace whole cell values equal to `find` in every sheet of every file.
    pub fn find_replace(&self, files: &[SourceFile], find: &str, replace: &str) -> EngineResult<OutputFile> {
        let spec = ReplaceSpec::new(find, replace)?;
        self.check_batch(files)?;
        let stamp = self.stamp();
        tracing::info!(files = files.len(), find = spec.find(), "Finding and replacing");

        let outcomes = files
            .iter()
            .map(|file| {
                let result = resolve_format(file, self.config).and_then(|format| {
                    let workbook = read_workbook(file, self.config)?;
                    Ok((TargetFormat::for_source(format), workbook))
                });
                FileOutcome::from_result(file, result)
            })
            .collect();

        let mut bundle = Bundle::new();
        for (file, (target, workbook)) in collect_ready("find_replace", outcomes) {
            let sheets = workbook
                .sheets
                .into_iter()
                .map(|sheet| NamedTable::new(self.sheet_label(sheet.name), sheet.table))
                .collect();
            let (sheets, replaced) = find_replace_sheets(sheets, &spec);
            tracing::debug!(file = %file, replaced, "Replaced cells");

            let bytes = match target {
                TargetFormat::Xlsx => write_workbook(&sheets)?,
                TargetFormat::Csv => {
                    let table = sheets.into_iter().next().map(|s| s.table).unwrap_or_default();
                    write_table(&table, target, &self.config.sheet_name)?
                }
            };
            bundle.add(output_name("replaced", &file, target), bytes);
        }

        if bundle.is_empty() {
            return Err(EngineError::NoValidInput("none of the files could be read".into()));
        }
        OutputFile::bundle(format!("find_replace_{}.zip", stamp), bundle)
    }

    /// Remove the listed columns from the first sheet of every file.
    pub fn delete_columns(&self, files: &[SourceFile], columns: &str) -> EngineResult<OutputFile> {
        let names = parse_column_list(columns)?;
        self.check_batch(files)?;
        let stamp = self.stamp();
        tracing::info!(files = files.len(), columns = ?names, "Deleting columns");

        let outcomes = files
            .iter()
            .map(|file| {
                let result = resolve_format(file, self.config).and_then(|format| {
                    let table = read_first_table(file, self.config)?;
                    Ok((TargetFormat::for_source(format), table))
                });
                FileOutcome::from_result(file, result)
            })
            .collect();

        let mut bundle = Bundle::new();
        for (file, (target, mut table)) in collect_ready("delete_columns", outcomes) {
            let removed = delete_columns(&mut table, &names);
            tracing::debug!(file = %file, ?removed, "Deleted columns");

            let bytes = write_table(&table, target, &self.config.sheet_name)?;
            bundle.add(output_name("columns_deleted", &file, target), bytes);
        }

        if bundle.is_empty() {
            return Err(EngineError::NoValidInput("none of the files could be read".into()));
        }
        OutputFile::bundle(format!("delete_columns_{}.zip", stamp), bundle)
    }

    // -------------------------------------------------------------------------
    // Filtering and conversion
    // -------------------------------------------------------------------------

    /// Keep rows whose `column` satisfies the condition, across all files.
    pub fn filter_rows(
        &self,
        files: &[SourceFile],
        column: &str,
        condition: Condition,
        value: &str,
    ) -> EngineResult<OutputFile> {
        let column = column.trim();
        if column.is_empty() {
            return Err(EngineError::invalid_parameter("column", "must not be empty"));
        }
        let predicate = Predicate::new(condition, value.trim())?;
        self.check_batch(files)?;
        let stamp = self.stamp();
        tracing::info!(files = files.len(), column, %condition, value, "Filtering rows");

        let inputs: Vec<NamedTable> = self
            .read_first_tables("filter_rows", files)
            .into_iter()
            .map(|(file, table)| NamedTable::new(file, table))
            .collect();
        if inputs.is_empty() {
            return Err(EngineError::NoValidInput("none of the files could be read".into()));
        }

        let filtered = filter_tables(inputs, column, &predicate, &self.config.source_file_column)?;
        tracing::info!(rows = filtered.row_count(), "Filtered rows");

        let bytes = write_xlsx(&filtered, &self.config.sheet_name)?;
        Ok(OutputFile::xlsx(format!("filtered_{}.xlsx", stamp), bytes))
    }

    /// Convert matching files in the requested direction, bundled.
    pub fn convert_format(&self, files: &[SourceFile], direction: ConvertDirection) -> EngineResult<OutputFile> {
        self.check_batch(files)?;
        let stamp = self.stamp();
        tracing::info!(files = files.len(), ?direction, "Converting files");

        let outcomes: Vec<FileOutcome<(String, Workbook)>> = files
            .iter()
            .filter_map(|file| match resolve_format(file, self.config) {
                Ok(format) if direction.accepts(format) => {
                    let result = read_workbook(file, self.config)
                        .map(|workbook| (file.base_name().to_string(), workbook));
                    Some(FileOutcome::from_result(file, result))
                }
                Ok(_) => {
                    tracing::debug!(file = %file.name, "Format does not match direction");
                    None
                }
                Err(e) => Some(FileOutcome::skipped(file, e.to_string())),
            })
            .collect();

        let target = direction.target();
        let mut bundle = Bundle::new();
        for (_, (base, workbook)) in collect_ready("convert_format", outcomes) {
            for output in convert_workbook(&base, workbook, direction, &self.config.sheet_name) {
                let bytes = write_table(&output.table, target, &self.config.sheet_name)?;
                bundle.add(format!("{}.{}", output.label, target.extension()), bytes);
            }
        }

        if bundle.is_empty() {
            return Err(EngineError::NoValidInput(format!(
                "no file matches the requested conversion ({:?})",
                direction
            )));
        }
        OutputFile::bundle(format!("converted_{}.zip", stamp), bundle)
    }
}

/// `<prefix>_<sanitized name>`, with the extension matching what was written.
fn output_name(prefix: &str, file: &str, target: TargetFormat) -> String {
    let name = with_extension(&secure_filename(file), target.extension());
    format!("{}_{}", prefix, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::CellValue;
    use crate::parser::spreadsheet::read_spreadsheet;
    use chrono::NaiveDate;
    use std::io::{Cursor, Read};

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

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

    fn xlsx_file(name: &str, table: &Table) -> SourceFile {
        SourceFile::new(name, write_xlsx(table, "Sheet1").unwrap())
    }

    fn entries(output: &OutputFile) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(output.bytes.clone())).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).unwrap();
                (file.name().to_string(), bytes)
            })
            .collect()
    }

    fn read_back(bytes: &[u8]) -> Table {
        read_spreadsheet("out.xlsx", bytes).unwrap().into_first_table()
    }

    #[test]
    fn test_merge_two_workbooks_with_source_column() {
        let config = EngineConfig::default();
        let files = vec![
            xlsx_file("a.xlsx", &table(&["Name", "Dept"], &[&["Zhang", "Sales"]])),
            xlsx_file("b.xlsx", &table(&["Name", "Dept"], &[&["Li", "Tech"]])),
        ];
        let output = Engine::new(&config)
            .at(fixed_time())
            .merge_files(
                &files,
                MergeOptions {
                    keep_headers: true,
                    add_source_column: true,
                },
            )
            .unwrap();

        assert_eq!(output.file_name, "merged_20240601_093000.xlsx");
        assert_eq!(output.content_type, XLSX_CONTENT_TYPE);

        let merged = read_back(&output.bytes);
        assert_eq!(
            merged.columns(),
            &["Name".to_string(), "Dept".to_string(), "SourceFile".to_string()]
        );
        assert_eq!(merged.rows()[0], vec![text("Zhang"), text("Sales"), text("a.xlsx")]);
        assert_eq!(merged.rows()[1], vec![text("Li"), text("Tech"), text("b.xlsx")]);
    }

    #[test]
    fn test_merge_skips_unreadable_files() {
        let config = EngineConfig::default();
        let files = vec![
            SourceFile::new("broken.xlsx", b"nope".to_vec()),
            SourceFile::new("notes.txt", b"x".to_vec()),
            SourceFile::new("ok.csv", b"k,v\n1,2\n".to_vec()),
        ];
        let output = Engine::new(&config).merge_files(&files, MergeOptions::default()).unwrap();
        assert_eq!(read_back(&output.bytes).row_count(), 1);

        let err = Engine::new(&config)
            .merge_files(&files[..2], MergeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidInput);
    }

    #[test]
    fn test_payload_ceiling() {
        let config = EngineConfig {
            max_upload_bytes: 4,
            ..EngineConfig::default()
        };
        let files = vec![SourceFile::new("a.csv", b"a,b\n1,2\n".to_vec())];
        let err = Engine::new(&config).merge_files(&files, MergeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
    }

    #[test]
    fn test_merge_sheets_tags_sheet_names() {
        let config = EngineConfig::default();
        let bytes = write_workbook(&[
            NamedTable::new("East", table(&["City"], &[&["Xiamen"]])),
            NamedTable::new("West", table(&["City"], &[&["Chengdu"]])),
        ])
        .unwrap();
        let output = Engine::new(&config)
            .at(fixed_time())
            .merge_sheets(&SourceFile::new("regions.xlsx", bytes), true)
            .unwrap();

        assert_eq!(output.file_name, "merged_sheets_20240601_093000.xlsx");
        let merged = read_back(&output.bytes);
        assert_eq!(merged.columns(), &["City".to_string(), "SourceSheet".to_string()]);
        assert_eq!(merged.rows()[1], vec![text("Chengdu"), text("West")]);
    }

    #[test]
    fn test_split_by_column_bundle() {
        let config = EngineConfig::default();
        let file = xlsx_file(
            "staff.xlsx",
            &table(&["Name", "Dept"], &[&["A", "Sales"], &["B", "R/D"], &["C", "Sales"], &["D", ""]]),
        );
        let output = Engine::new(&config)
            .at(fixed_time())
            .split_by_column(&file, "Dept")
            .unwrap();

        assert_eq!(output.file_name, "split_by_column_20240601_093000.zip");
        assert_eq!(output.content_type, ZIP_CONTENT_TYPE);

        let entries = entries(&output);
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Sales_20240601_093000.xlsx",
                "R_D_20240601_093000.xlsx",
                "blank_20240601_093000.xlsx"
            ]
        );
        assert_eq!(read_back(&entries[0].1).row_count(), 2);
    }

    #[test]
    fn test_split_by_column_missing_column() {
        let config = EngineConfig::default();
        let file = SourceFile::new("a.csv", b"x\n1\n".to_vec());
        let err = Engine::new(&config).split_by_column(&file, "Dept").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
    }

    #[test]
    fn test_split_by_rows_bundle() {
        let config = EngineConfig::default();
        let file = SourceFile::new("n.csv", b"n\n1\n2\n3\n4\n5\n".to_vec());
        let output = Engine::new(&config).at(fixed_time()).split_by_rows(&file, 2).unwrap();

        let entries = entries(&output);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "part_1_20240601_093000.xlsx");
        assert_eq!(entries[2].0, "part_3_20240601_093000.xlsx");
        assert_eq!(read_back(&entries[2].1).rows(), &[vec![CellValue::Number(5.0)]]);

        let err = Engine::new(&config).split_by_rows(&file, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_split_header_only_file_gives_empty_bundle() {
        let config = EngineConfig::default();
        let file = SourceFile::new("h.csv", b"a,b\n".to_vec());
        let engine = Engine::new(&config).at(fixed_time());

        let output = engine.split_by_rows(&file, 2).unwrap();
        assert_eq!(output.file_name, "split_by_rows_20240601_093000.zip");
        assert!(entries(&output).is_empty());

        let output = engine.split_by_column(&file, "a").unwrap();
        assert!(entries(&output).is_empty());
    }

    #[test]
    fn test_find_replace_keeps_formats_and_sheets() {
        let config = EngineConfig::default();
        let workbook = write_workbook(&[
            NamedTable::new("One", table(&["s"], &[&["old"]])),
            NamedTable::new("Two", table(&["s"], &[&["old"], &["older"]])),
        ])
        .unwrap();
        let files = vec![
            SourceFile::new("book.xlsx", workbook),
            SourceFile::new("list.csv", b"s\nold\n".to_vec()),
            SourceFile::new("bad.xlsx", b"garbage".to_vec()),
        ];
        let output = Engine::new(&config)
            .at(fixed_time())
            .find_replace(&files, "old", "new")
            .unwrap();
        assert_eq!(output.file_name, "find_replace_20240601_093000.zip");

        let entries = entries(&output);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "replaced_book.xlsx");
        assert_eq!(entries[1].0, "replaced_list.csv");

        let sheets = read_spreadsheet("x.xlsx", &entries[0].1).unwrap().sheets;
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[1].name.as_deref(), Some("Two"));
        assert_eq!(sheets[1].table.rows()[0][0], text("new"));
        assert_eq!(sheets[1].table.rows()[1][0], text("older"));

        let csv = String::from_utf8(entries[1].1[3..].to_vec()).unwrap();
        assert_eq!(csv, "s\nnew\n");
    }

    #[test]
    fn test_find_replace_requires_find_text() {
        let config = EngineConfig::default();
        let err = Engine::new(&config).find_replace(&[], "  ", "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_delete_columns_per_file() {
        let config = EngineConfig::default();
        let files = vec![
            xlsx_file("staff.xls.xlsx", &table(&["Name", "Dept", "Salary"], &[&["A", "Ops", "10"]])),
            SourceFile::new("other.csv", b"Name,Salary\nB,20\n".to_vec()),
        ];
        let output = Engine::new(&config).delete_columns(&files, "Dept, Missing").unwrap();

        let entries = entries(&output);
        assert_eq!(entries[0].0, "columns_deleted_staff.xls.xlsx");
        assert_eq!(
            read_back(&entries[0].1).columns(),
            &["Name".to_string(), "Salary".to_string()]
        );
        assert_eq!(entries[1].0, "columns_deleted_other.csv");

        let err = Engine::new(&config).delete_columns(&files, " , ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_delete_columns_keeps_long_identifiers() {
        let config = EngineConfig::default();
        let files = vec![SourceFile::new(
            "ids.csv",
            "Name,ID,Note\nZhang,110101199003074514,x\nLi,9007199254740993,y\n".as_bytes().to_vec(),
        )];
        let output = Engine::new(&config).delete_columns(&files, "Note").unwrap();

        let entries = entries(&output);
        let csv = String::from_utf8(entries[0].1[3..].to_vec()).unwrap();
        assert_eq!(csv, "Name,ID\nZhang,110101199003074514\nLi,9007199254740993\n");
    }

    #[test]
    fn test_filter_rows_aligns_reordered_columns() {
        let config = EngineConfig::default();
        let files = vec![
            SourceFile::new("a.csv", b"Name,Score\nx,30\n".to_vec()),
            SourceFile::new("b.csv", b"Score,Name\n40,y\n".to_vec()),
        ];
        let output = Engine::new(&config)
            .filter_rows(&files, "Score", Condition::GreaterThan, "20")
            .unwrap();

        let result = read_back(&output.bytes);
        assert_eq!(
            result.columns(),
            &["Name".to_string(), "Score".to_string(), "SourceFile".to_string()]
        );
        assert_eq!(result.rows()[1], vec![text("y"), CellValue::Number(40.0), text("b.csv")]);
    }

    #[test]
    fn test_filter_rows_across_files() {
        let config = EngineConfig::default();
        let files = vec![
            SourceFile::new("a.csv", b"Name,Score\nx,10\ny,abc\nz,30\n".to_vec()),
            SourceFile::new("b.csv", b"Other\n1\n".to_vec()),
            SourceFile::new("c.csv", b"Name,Score\nw,25\n".to_vec()),
        ];
        let output = Engine::new(&config)
            .at(fixed_time())
            .filter_rows(&files, "Score", Condition::GreaterThan, "20")
            .unwrap();
        assert_eq!(output.file_name, "filtered_20240601_093000.xlsx");

        let result = read_back(&output.bytes);
        assert_eq!(result.columns()[2], "SourceFile");
        assert_eq!(result.rows()[0], vec![text("z"), CellValue::Number(30.0), text("a.csv")]);
        assert_eq!(result.rows()[1], vec![text("w"), CellValue::Number(25.0), text("c.csv")]);
    }

    #[test]
    fn test_filter_rows_errors() {
        let config = EngineConfig::default();
        let files = vec![SourceFile::new("a.csv", b"Score\n1\n".to_vec())];
        let engine = Engine::new(&config);

        let err = engine.filter_rows(&files, "Score", Condition::GreaterThan, "big").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = engine.filter_rows(&files, "Score", Condition::Equals, "9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatch);

        let err = engine.filter_rows(&files, " ", Condition::Equals, "9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_convert_xlsx_to_csv_per_sheet() {
        let config = EngineConfig::default();
        let workbook = write_workbook(&[
            NamedTable::new("Q1", table(&["v"], &[&["1"]])),
            NamedTable::new("Q2", table(&["v"], &[&["2"]])),
        ])
        .unwrap();
        let files = vec![
            SourceFile::new("sales.xlsx", workbook),
            SourceFile::new("skip.csv", b"v\n3\n".to_vec()),
        ];
        let output = Engine::new(&config)
            .at(fixed_time())
            .convert_format(&files, ConvertDirection::XlsxToCsv)
            .unwrap();
        assert_eq!(output.file_name, "converted_20240601_093000.zip");

        let entries = entries(&output);
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["sales_Q1.csv", "sales_Q2.csv"]);
        assert_eq!(&entries[1].1[3..], b"v\n2\n");
    }

    #[test]
    fn test_convert_csv_to_xlsx() {
        let config = EngineConfig::default();
        let files = vec![SourceFile::new("data.csv", b"a,b\n1,x\n".to_vec())];
        let output = Engine::new(&config)
            .convert_format(&files, ConvertDirection::CsvToXlsx)
            .unwrap();

        let entries = entries(&output);
        assert_eq!(entries[0].0, "data.xlsx");
        assert_eq!(read_back(&entries[0].1).rows()[0], vec![CellValue::Number(1.0), text("x")]);

        let err = Engine::new(&config)
            .convert_format(&files, ConvertDirection::XlsxToCsv)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidInput);
    }
}
