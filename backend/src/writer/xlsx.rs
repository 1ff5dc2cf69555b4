//! Minimal Office Open XML workbook writer.
//!
//! Produces a package with one worksheet per table, inline strings for text,
//! and a style sheet carrying two date formats. Only values are written.

use crate::error::{EngineError, EngineResult};
use crate::models::cell::{format_number, to_excel_serial};
use crate::models::{CellValue, NamedTable, Table};
use chrono::NaiveTime;
use quick_xml::escape::escape;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAX_SHEET_NAME_CHARS: usize = 31;
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// cellXfs indices in `styles.xml`.
const STYLE_DATE: u8 = 1;
const STYLE_DATETIME: u8 = 2;

const CONTENT_TYPES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="22" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Write a single-sheet workbook.
pub fn write_xlsx(table: &Table, sheet_name: &str) -> EngineResult<Vec<u8>> {
    write_sheets(&[(sheet_name, table)])
}

/// Write a multi-sheet workbook, keeping the given order.
pub fn write_workbook(sheets: &[NamedTable]) -> EngineResult<Vec<u8>> {
    let sheets: Vec<(&str, &Table)> = sheets
        .iter()
        .map(|sheet| (sheet.label.as_str(), &sheet.table))
        .collect();
    write_sheets(&sheets)
}

fn write_sheets(sheets: &[(&str, &Table)]) -> EngineResult<Vec<u8>> {
    if sheets.is_empty() {
        return Err(EngineError::Encode("A workbook needs at least one sheet".into()));
    }
    let names = unique_sheet_names(sheets.iter().map(|(name, _)| *name));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(&names).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES.as_bytes())?;

    for (index, (_, table)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
        zip.write_all(worksheet_xml(table).as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(CONTENT_TYPES_HEAD);
    for index in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            index
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn workbook_xml(names: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (index, name) in names.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name.as_str()),
            index + 1,
            index + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for index in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            index, index
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn worksheet_xml(table: &Table) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    if table.width() > 0 {
        write_row(&mut xml, 1, &table.header_cells());
        for (index, row) in table.rows().iter().enumerate() {
            write_row(&mut xml, index + 2, row);
        }
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_row(xml: &mut String, row_number: usize, cells: &[CellValue]) {
    xml.push_str(&format!(r#"<row r="{}">"#, row_number));
    for (col, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_to_letters(col as u32 + 1), row_number);
        write_cell(xml, &cell_ref, cell);
    }
    xml.push_str("</row>");
}

fn write_cell(xml: &mut String, cell_ref: &str, value: &CellValue) {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => write_inline_string(xml, cell_ref, s),
        CellValue::Number(n) if n.is_finite() => {
            xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, format_number(*n)));
        }
        CellValue::Number(n) => write_inline_string(xml, cell_ref, &n.to_string()),
        CellValue::Bool(b) => {
            xml.push_str(&format!(
                r#"<c r="{}" t="b"><v>{}</v></c>"#,
                cell_ref,
                if *b { "1" } else { "0" }
            ));
        }
        CellValue::Date(d) => {
            let style = if d.time() == NaiveTime::MIN {
                STYLE_DATE
            } else {
                STYLE_DATETIME
            };
            xml.push_str(&format!(
                r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                cell_ref,
                style,
                to_excel_serial(d)
            ));
        }
    }
}

fn write_inline_string(xml: &mut String, cell_ref: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    let clean: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    xml.push_str(&format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref,
        escape(clean.as_str())
    ));
}

/// Characters allowed in XML 1.0 text.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || c >= ' '
}

/// Convert a 1-based column number to letters (1 -> "A", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// Make a string acceptable as a worksheet name.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .filter(|c| !c.is_control())
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Sanitized names, de-duplicated case-insensitively with a numeric suffix.
fn unique_sheet_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for name in names {
        let base = sanitize_sheet_name(name);
        let mut candidate = base.clone();
        let mut counter = 2;
        while !seen.insert(candidate.to_lowercase()) {
            let suffix = format!(" ({})", counter);
            let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
            counter += 1;
        }
        result.push(candidate);
    }
    result
}
