//! planilla - CSV to Excel Workbook Conversion in Pure Rust
//!
//! Converts comma-separated-values files into single-sheet `.xlsx`
//! workbooks. Headers are preserved verbatim, no index column is added,
//! and cell types survive where the format supports them: numbers as
//! numbers, booleans as booleans, text as text, empty cells as blanks.
//!
//! # Design Principles
//!
//! 1. **One-shot** - a conversion is a single synchronous call; it fully
//!    succeeds or fails with a typed, reportable reason
//! 2. **Pure Rust** - no Python, no FFI, no spreadsheet application
//!    required
//! 3. **Typed failures** - bad input file, bad output location, and
//!    everything else are distinct error kinds, never a stack trace
//! 4. **Arrow-backed** - CSV parsing and per-column type inference ride
//!    on Arrow `RecordBatch`es
//!
//! # Quick Start
//!
//! ```no_run
//! let summary = planilla::convert("data.csv", "data.xlsx").unwrap();
//! println!("Wrote {} rows to {}", summary.rows, summary.output.display());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::float_cmp
    )
)]
#![allow(clippy::uninlined_format_args)]

pub mod convert;
pub mod dataset;
pub mod error;
pub mod workbook;

// Re-exports for convenience
// Re-export arrow types commonly needed
pub use arrow::{
    array::RecordBatch,
    datatypes::{Schema, SchemaRef},
};
pub use convert::{
    convert, convert_with_options, ensure_xlsx_extension, ConvertOptions, ConvertSummary,
};
pub use dataset::{CsvOptions, TabularDataset};
pub use error::{Error, Result};
pub use workbook::{
    sanitize_sheet_name, write_xlsx, XlsxOptions, DEFAULT_SHEET_NAME, SHEET_NAME_MAX_LEN,
    XLSX_MAX_COLS, XLSX_MAX_ROWS,
};
