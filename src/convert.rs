//! CSV to XLSX conversion.
//!
//! The single operation of this crate: read a CSV source fully into a
//! [`TabularDataset`], serialize it as a single-sheet workbook at the
//! destination path. One shot, synchronous, no retries — conversion
//! either fully succeeds or fails with a reported reason.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    dataset::{CsvOptions, TabularDataset},
    error::{Error, Result},
    workbook::{self, XlsxOptions},
};

/// Options for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Whether the CSV source has a header row.
    pub has_header: bool,
    /// Field delimiter (default is comma).
    pub delimiter: Option<u8>,
    /// Worksheet name for the output workbook.
    pub sheet_name: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            sheet_name: None,
        }
    }
}

impl ConvertOptions {
    /// Creates new conversion options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the CSV source has a header row.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets the worksheet name.
    #[must_use]
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertSummary {
    /// Number of data rows written (header excluded).
    pub rows: usize,
    /// Number of columns written.
    pub columns: usize,
    /// Path of the workbook that was written.
    pub output: PathBuf,
}

/// Converts a CSV file into an XLSX workbook with default options.
///
/// # Example
///
/// ```no_run
/// let summary = planilla::convert("data.csv", "data.xlsx").unwrap();
/// println!("{} rows written", summary.rows);
/// ```
///
/// # Errors
///
/// - [`Error::SourceInvalid`] — source missing, unreadable, or not valid
///   CSV; the output file is not created or modified.
/// - [`Error::DestinationInvalid`] — destination directory missing or
///   unwritable; no partial output is left behind.
/// - [`Error::Unexpected`] — any other read or write failure.
pub fn convert(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<ConvertSummary> {
    convert_with_options(csv_path, output_path, &ConvertOptions::default())
}

/// Converts a CSV file into an XLSX workbook.
///
/// # Errors
///
/// Same conditions as [`convert`].
pub fn convert_with_options(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let csv_path = csv_path.as_ref();
    let output_path = output_path.as_ref();

    // Validation order matters: a bad source must be reported before the
    // destination is touched in any way.
    validate_source(csv_path)?;
    validate_destination(output_path)?;

    let mut csv_options = CsvOptions::new().with_header(options.has_header);
    if let Some(delim) = options.delimiter {
        csv_options = csv_options.with_delimiter(delim);
    }
    let dataset = TabularDataset::from_csv_with_options(csv_path, csv_options)?;

    let mut xlsx_options = XlsxOptions::new();
    if let Some(name) = &options.sheet_name {
        xlsx_options = xlsx_options.with_sheet_name(name);
    }
    workbook::write_xlsx(&dataset, output_path, &xlsx_options)?;

    Ok(ConvertSummary {
        rows: dataset.len(),
        columns: dataset.num_columns(),
        output: output_path.to_path_buf(),
    })
}

/// Appends the `.xlsx` extension unless the path already carries it.
///
/// Appending preserves any existing dotted suffix: `report.v2` becomes
/// `report.v2.xlsx`, while `out.xlsx` is returned unchanged.
pub fn ensure_xlsx_extension(path: PathBuf) -> PathBuf {
    let already_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if already_xlsx {
        return path;
    }

    let mut file_name = match path.file_name() {
        Some(name) => name.to_os_string(),
        None => return path,
    };
    file_name.push(".xlsx");
    path.with_file_name(file_name)
}

fn validate_source(path: &Path) -> Result<()> {
    let metadata =
        fs::metadata(path).map_err(|e| Error::source_invalid(path, e.to_string()))?;
    if !metadata.is_file() {
        return Err(Error::source_invalid(path, "not a regular file"));
    }
    Ok(())
}

fn validate_destination(path: &Path) -> Result<()> {
    let dir = workbook::parent_dir(path);
    let metadata =
        fs::metadata(dir).map_err(|e| Error::destination_invalid(dir, e.to_string()))?;
    if !metadata.is_dir() {
        return Err(Error::destination_invalid(dir, "not a directory"));
    }
    Ok(())
}
