//! XLSX workbook serialization for tabular datasets.
//!
//! Writes a [`TabularDataset`] as a single-worksheet workbook: header row
//! first, one worksheet row per data row in original order, no row-index
//! column. The workbook is buffered in memory and written to disk through
//! a temporary file in the destination directory, so a partially written
//! workbook is never left at the output path.

use std::{io::Write, path::Path};

use arrow::{
    array::{Array, BooleanArray, Float64Array, LargeStringArray, RecordBatch, StringArray},
    compute::cast,
    datatypes::DataType,
    util::display::array_value_to_string,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::{
    dataset::TabularDataset,
    error::{Error, Result},
};

/// Maximum number of worksheet rows in the XLSX format (header included).
pub const XLSX_MAX_ROWS: usize = 1_048_576;

/// Maximum number of worksheet columns in the XLSX format.
pub const XLSX_MAX_COLS: usize = 16_384;

/// Maximum worksheet name length accepted by Excel.
pub const SHEET_NAME_MAX_LEN: usize = 31;

/// Worksheet name used when none is supplied.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Characters Excel forbids in worksheet names.
const SHEET_NAME_ILLEGAL: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Options for workbook writing.
#[derive(Debug, Clone)]
pub struct XlsxOptions {
    /// Worksheet name (sanitized before use).
    pub sheet_name: String,
    /// Whether the header row is written in bold.
    pub bold_header: bool,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            bold_header: true,
        }
    }
}

impl XlsxOptions {
    /// Creates new workbook options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worksheet name.
    #[must_use]
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Sets whether the header row is written in bold.
    #[must_use]
    pub fn with_bold_header(mut self, bold_header: bool) -> Self {
        self.bold_header = bold_header;
        self
    }
}

/// Writes the dataset as a single-sheet XLSX workbook at `path`.
///
/// The header row is written first using the column names verbatim, then
/// one row per data row in original order. Numbers are written as
/// numbers, booleans as booleans, text as text; nulls become blank cells.
///
/// # Errors
///
/// Returns [`Error::DestinationInvalid`] if the destination directory
/// rejects the file, and [`Error::Unexpected`] for capacity overflows or
/// write failures.
pub fn write_xlsx(
    dataset: &TabularDataset,
    path: impl AsRef<Path>,
    options: &XlsxOptions,
) -> Result<()> {
    let path = path.as_ref();

    let num_columns = dataset.num_columns();
    if num_columns > XLSX_MAX_COLS {
        return Err(Error::unexpected(format!(
            "{} columns exceed the XLSX limit of {}",
            num_columns, XLSX_MAX_COLS
        )));
    }
    // +1 for the header row
    if dataset.len() + 1 > XLSX_MAX_ROWS {
        return Err(Error::unexpected(format!(
            "{} rows exceed the XLSX limit of {} (header included)",
            dataset.len() + 1,
            XLSX_MAX_ROWS
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sanitize_sheet_name(&options.sheet_name))
        .map_err(xlsx_err)?;

    let header_format = Format::new().set_bold();
    for (col_idx, name) in dataset.column_names().iter().enumerate() {
        let col = xlsx_col(col_idx)?;
        if options.bold_header {
            worksheet
                .write_string_with_format(0, col, *name, &header_format)
                .map_err(xlsx_err)?;
        } else {
            worksheet.write_string(0, col, *name).map_err(xlsx_err)?;
        }
    }

    let mut row_offset = 1usize;
    for batch in dataset.iter() {
        write_batch(worksheet, batch, row_offset)?;
        row_offset += batch.num_rows();
    }

    let buffer = workbook.save_to_buffer().map_err(xlsx_err)?;
    save_atomic(&buffer, path)
}

/// Returns a worksheet name Excel will accept.
///
/// Illegal characters are replaced with `_`, the result is clamped to
/// [`SHEET_NAME_MAX_LEN`] characters, and an empty name falls back to
/// [`DEFAULT_SHEET_NAME`].
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
        .take(SHEET_NAME_MAX_LEN)
        .collect();

    if cleaned.is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned
    }
}

/// Resolves the directory a file path will land in.
///
/// An empty or missing parent means the current directory.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn write_batch(worksheet: &mut Worksheet, batch: &RecordBatch, row_offset: usize) -> Result<()> {
    for (col_idx, column) in batch.columns().iter().enumerate() {
        let col = xlsx_col(col_idx)?;

        match column.data_type() {
            DataType::Null => {} // all cells blank
            DataType::Boolean => {
                let values = downcast::<BooleanArray>(column.as_ref())?;
                for i in 0..values.len() {
                    if values.is_null(i) {
                        continue;
                    }
                    worksheet
                        .write_boolean(xlsx_row(row_offset + i)?, col, values.value(i))
                        .map_err(xlsx_err)?;
                }
            }
            dt if dt.is_numeric() => {
                // Excel stores every number as an IEEE double.
                let casted = cast(column.as_ref(), &DataType::Float64)
                    .map_err(|e| Error::unexpected(format!("numeric cast failed: {e}")))?;
                let values = downcast::<Float64Array>(casted.as_ref())?;
                for i in 0..values.len() {
                    if values.is_null(i) {
                        continue;
                    }
                    worksheet
                        .write_number(xlsx_row(row_offset + i)?, col, values.value(i))
                        .map_err(xlsx_err)?;
                }
            }
            DataType::Utf8 => {
                let values = downcast::<StringArray>(column.as_ref())?;
                for i in 0..values.len() {
                    // Empty text is a missing value, not an empty-string cell.
                    if values.is_null(i) || values.value(i).is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(xlsx_row(row_offset + i)?, col, values.value(i))
                        .map_err(xlsx_err)?;
                }
            }
            DataType::LargeUtf8 => {
                let values = downcast::<LargeStringArray>(column.as_ref())?;
                for i in 0..values.len() {
                    if values.is_null(i) || values.value(i).is_empty() {
                        continue;
                    }
                    worksheet
                        .write_string(xlsx_row(row_offset + i)?, col, values.value(i))
                        .map_err(xlsx_err)?;
                }
            }
            // Dates, timestamps and anything else arrow inferred: written
            // as display text (formatting preservation is out of scope).
            _ => {
                for i in 0..column.len() {
                    if column.is_null(i) {
                        continue;
                    }
                    let text = array_value_to_string(column.as_ref(), i)
                        .map_err(|e| Error::unexpected(format!("cell rendering failed: {e}")))?;
                    worksheet
                        .write_string(xlsx_row(row_offset + i)?, col, &text)
                        .map_err(xlsx_err)?;
                }
            }
        }
    }

    Ok(())
}

/// Writes the workbook bytes through a temporary file, then renames it
/// over `path`. The temporary file lives in the destination directory so
/// the rename never crosses filesystems.
fn save_atomic(buffer: &[u8], path: &Path) -> Result<()> {
    let dir = parent_dir(path);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::destination_invalid(dir, e.to_string()))?;
    tmp.write_all(buffer)
        .map_err(|e| Error::unexpected(format!("failed to write workbook: {e}")))?;
    tmp.persist(path)
        .map_err(|e| Error::destination_invalid(path, e.error.to_string()))?;

    Ok(())
}

fn downcast<'a, T: 'static>(array: &'a dyn Array) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::unexpected("column type mismatch during XLSX write"))
}

fn xlsx_row(row: usize) -> Result<u32> {
    u32::try_from(row).map_err(|_| Error::unexpected(format!("row index overflow: {row}")))
}

fn xlsx_col(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| Error::unexpected(format!("column index overflow: {col}")))
}

fn xlsx_err(err: XlsxError) -> Error {
    Error::unexpected(format!("XLSX write error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema};

    use super::*;

    #[test]
    fn test_sanitize_sheet_name_passthrough() {
        assert_eq!(sanitize_sheet_name("Datos"), "Datos");
    }

    #[test]
    fn test_sanitize_sheet_name_illegal_chars() {
        assert_eq!(sanitize_sheet_name("ventas: 2024"), "ventas_ 2024");
        assert_eq!(sanitize_sheet_name("a[b]c/d\\e*f?g"), "a_b_c_d_e_f_g");
    }

    #[test]
    fn test_sanitize_sheet_name_truncates() {
        let long = "x".repeat(64);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), SHEET_NAME_MAX_LEN);
    }

    #[test]
    fn test_sanitize_sheet_name_empty_falls_back() {
        assert_eq!(sanitize_sheet_name(""), DEFAULT_SHEET_NAME);
        assert_eq!(sanitize_sheet_name("   "), DEFAULT_SHEET_NAME);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("/tmp/out.xlsx")), Path::new("/tmp"));
        assert_eq!(parent_dir(Path::new("out.xlsx")), Path::new("."));
    }

    #[test]
    fn test_column_limit_rejected() {
        let fields: Vec<Field> = (0..=XLSX_MAX_COLS)
            .map(|i| Field::new(format!("c{i}"), DataType::Null, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let dataset = TabularDataset::new(schema, vec![])
            .ok()
            .unwrap_or_else(|| panic!("Dataset should build"));

        let temp_dir = tempfile::tempdir()
            .ok()
            .unwrap_or_else(|| panic!("Should create temp dir"));
        let result = write_xlsx(
            &dataset,
            temp_dir.path().join("wide.xlsx"),
            &XlsxOptions::default(),
        );
        assert!(matches!(result, Err(Error::Unexpected { .. })));
    }

    #[test]
    fn test_xlsx_row_col_bounds() {
        assert!(xlsx_row(0).is_ok());
        assert!(xlsx_col(XLSX_MAX_COLS - 1).is_ok());
        assert!(xlsx_col(usize::MAX).is_err());
    }
}
