//! Bundle builder: packages named outputs into one zip archive.

use crate::error::EngineResult;
use crate::naming::with_counter;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Ordered filename -> bytes mapping with unique names.
#[derive(Debug, Default)]
pub struct Bundle {
    entries: Vec<(String, Vec<u8>)>,
    names: HashSet<String>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A name already present gets a ` (n)` counter before its
    /// extension. Returns the name actually stored.
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> String {
        let name = name.into();
        let mut stored = name.clone();
        let mut counter = 2;
        while self.names.contains(&stored) {
            stored = with_counter(&name, counter);
            counter += 1;
        }
        self.names.insert(stored.clone());
        self.entries.push((stored.clone(), bytes));
        stored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry, in insertion order, into a deflated zip archive.
    pub fn into_zip(self) -> EngineResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}
