//! Delimited-text decoding with encoding and delimiter auto-detection.
//!
//! Every physical row is materialized as-is; the first row becomes the table
//! header. Cell kinds are inferred with [`CellValue::infer`].

use crate::error::{SourceError, SourceResult};
use crate::models::{CellValue, Sheet, Table, Workbook};
use encoding_rs::Encoding;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Candidate separators, in tie-break order.
const SEPARATORS: [char; 4] = [',', ';', '\t', '|'];

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins outright; otherwise chardet's guess is used, normalized
/// to a WHATWG label.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }
    let (charset, _confidence, _language) = chardet::detect(bytes);

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "gb2312" | "gb18030" | "gbk" => "gbk".to_string(),
        "" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given label. Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match Encoding::for_label(encoding.as_bytes()) {
        Some(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &SEPARATORS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode delimited text into a single unnamed sheet.
pub fn read_csv(file: &str, bytes: &[u8]) -> SourceResult<Workbook> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    if content.trim().is_empty() {
        return Err(SourceError::decode(file, "No columns to parse from file"));
    }

    let delimiter = detect_delimiter(&content);
    tracing::debug!(file, encoding = %encoding, delimiter = ?delimiter, "Parsing delimited text");

    let rows = parse_rows(&content, delimiter).map_err(|e| SourceError::decode(file, e))?;
    Ok(Workbook::new(vec![Sheet::unnamed(Table::from_physical_rows(rows))]))
}

/// Parse already-decoded text with an explicit delimiter.
pub fn parse_rows(content: &str, delimiter: char) -> Result<Vec<Vec<CellValue>>, csv::Error> {
    let mut delimiter_bytes = [0u8; 4];
    let delimiter_byte = delimiter.encode_utf8(&mut delimiter_bytes).as_bytes()[0];

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_byte)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }
    Ok(rows)
}
