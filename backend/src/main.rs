//! Sheetbatch CLI - batch operations over spreadsheets and CSV files
//!
//! # Commands
//!
//! ```bash
//! sheetbatch merge-files a.xlsx b.csv --add-source-column -o out/
//! sheetbatch merge-sheets book.xlsx --add-sheet-column
//! sheetbatch split-by-column staff.xlsx --column Dept
//! sheetbatch split-by-rows big.csv --rows 500
//! sheetbatch find-replace *.xlsx --find N/A --replace ""
//! sheetbatch delete-columns *.csv --columns "Phone,Email"
//! sheetbatch filter-rows *.xlsx --column Score --condition ">=" --value 60
//! sheetbatch convert-format *.xlsx --direction xlsx_to_csv
//! sheetbatch config                 # Show effective configuration
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `sheetbatch=info`).

use clap::{Parser, Subcommand};
use sheetbatch::transform::parse_rows_per_file;
use sheetbatch::{
    Condition, ConvertDirection, Engine, EngineConfig, EngineError, MergeOptions, OutputFile,
    SourceFile,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbatch")]
#[command(about = "Batch transformations over spreadsheets and CSV files", long_about = None)]
struct Cli {
    /// Directory the result is written to
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Concatenate the first sheet of every file
    MergeFiles {
        /// Input files, merged in this order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keep the header row of every file after the first as data
        #[arg(long)]
        no_keep_headers: bool,

        /// Append a column with the originating file name
        #[arg(long)]
        add_source_column: bool,
    },

    /// Flatten every sheet of one workbook into one sheet
    MergeSheets {
        /// Input workbook
        file: PathBuf,

        /// Append a column with the originating sheet name
        #[arg(long)]
        add_sheet_column: bool,
    },

    /// One output per distinct value of a column
    SplitByColumn {
        /// Input file
        file: PathBuf,

        /// Column to partition on
        #[arg(short, long)]
        column: String,
    },

    /// Chunks of at most N data rows
    SplitByRows {
        /// Input file
        file: PathBuf,

        /// Data rows per output file
        #[arg(short, long)]
        rows: String,
    },

    /// Replace cells whose whole value equals the search text
    FindReplace {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Text to search for
        #[arg(short, long)]
        find: String,

        /// Replacement (empty clears the cell)
        #[arg(short, long, default_value = "")]
        replace: String,
    },

    /// Remove columns by name
    DeleteColumns {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Comma-separated column names
        #[arg(short, long)]
        columns: String,
    },

    /// Keep rows matching a condition, across all files
    FilterRows {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Column to test
        #[arg(long)]
        column: String,

        /// equals, not_equals, contains, not_contains, greater_than,
        /// less_than, greater_or_equal, less_or_equal (or == != > < >= <=)
        #[arg(long)]
        condition: String,

        /// Comparison value
        #[arg(long)]
        value: String,
    },

    /// Convert between xlsx and csv
    ConvertFormat {
        /// Input files; those not matching the direction are skipped
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// xlsx_to_csv or csv_to_xlsx
        #[arg(short, long)]
        direction: String,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Cannot read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Cannot write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.kind().as_str(),
            Self::Read { .. } | Self::Write { .. } => "io",
            Self::Json(_) => "encode",
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();

    if let Err(e) = run(cli, &config) {
        eprintln!("{}: {}", e.kind(), e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sheetbatch=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, config: &EngineConfig) -> Result<(), CliError> {
    let engine = Engine::new(config);

    let output = match cli.command {
        Commands::MergeFiles {
            files,
            no_keep_headers,
            add_source_column,
        } => {
            let options = MergeOptions {
                keep_headers: !no_keep_headers,
                add_source_column,
            };
            engine.merge_files(&load_all(&files)?, options)?
        }

        Commands::MergeSheets { file, add_sheet_column } => {
            engine.merge_sheets(&load(&file)?, add_sheet_column)?
        }

        Commands::SplitByColumn { file, column } => engine.split_by_column(&load(&file)?, &column)?,

        Commands::SplitByRows { file, rows } => {
            let rows = parse_rows_per_file(&rows)?;
            engine.split_by_rows(&load(&file)?, rows)?
        }

        Commands::FindReplace { files, find, replace } => {
            engine.find_replace(&load_all(&files)?, &find, &replace)?
        }

        Commands::DeleteColumns { files, columns } => {
            engine.delete_columns(&load_all(&files)?, &columns)?
        }

        Commands::FilterRows {
            files,
            column,
            condition,
            value,
        } => {
            let condition: Condition = condition.parse()?;
            engine.filter_rows(&load_all(&files)?, &column, condition, &value)?
        }

        Commands::ConvertFormat { files, direction } => {
            let direction: ConvertDirection = direction.parse()?;
            engine.convert_format(&load_all(&files)?, direction)?
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }
    };

    let path = write_output(&cli.output_dir, &output)?;
    println!("{}", path.display());
    Ok(())
}

fn load(path: &Path) -> Result<SourceFile, CliError> {
    SourceFile::from_path(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_all(paths: &[PathBuf]) -> Result<Vec<SourceFile>, CliError> {
    paths.iter().map(|p| load(p)).collect()
}

fn write_output(dir: &Path, output: &OutputFile) -> Result<PathBuf, CliError> {
    let path = dir.join(&output.file_name);
    let write_err = |source| CliError::Write {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(write_err)?;
    fs::write(&path, &output.bytes).map_err(write_err)?;
    tracing::info!(path = %path.display(), bytes = output.bytes.len(), "Wrote output");
    Ok(path)
}
