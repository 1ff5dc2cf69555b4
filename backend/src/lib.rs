//! # Sheetbatch - batch transformations over spreadsheets and CSV files
//!
//! Sheetbatch reads workbooks (`.xlsx`, `.xls`) and delimited text into a
//! uniform table model, applies one whole-dataset operation, and writes the
//! result back as a single file or a zip bundle.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ xlsx / csv  │────▶│   Parser    │────▶│  Transform  │────▶│   Writer    │
//! │   bytes     │     │  (auto-enc) │     │ (8 batch op)│     │ (+ bundle)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheetbatch::{Engine, EngineConfig, SourceFile};
//!
//! let config = EngineConfig::default();
//! let file = SourceFile::from_path("staff.xlsx")?;
//! let output = Engine::new(&config).split_by_column(&file, "Dept")?;
//! println!("{} ({} bytes)", output.file_name, output.bytes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Per-file and operation-level error types
//! - [`config`] - Engine configuration
//! - [`models`] - Cells, tables, sheets and workbooks
//! - [`parser`] - Source reader with encoding and delimiter detection
//! - [`writer`] - CSV and xlsx encoders
//! - [`bundle`] - Zip bundle builder
//! - [`naming`] - Output file naming
//! - [`transform`] - Pure table transformations
//! - [`engine`] - Operation entry points

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Reading and writing
pub mod bundle;
pub mod naming;
pub mod parser;
pub mod writer;

// Transformation
pub mod engine;
pub mod transform;

// =============================================================================
// Re-exports - Errors and configuration
// =============================================================================

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ErrorKind, SourceError, SourceResult};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, NamedTable, Sheet, Table, Workbook};

// =============================================================================
// Re-exports - Reading and writing
// =============================================================================

pub use bundle::Bundle;
pub use parser::{read_first_table, read_workbook, FileFormat, SourceFile};
pub use writer::{write_table, TargetFormat};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{Engine, FileOutcome, OutputFile};
pub use transform::{Condition, ConvertDirection, MergeOptions, Predicate, ReplaceSpec};
