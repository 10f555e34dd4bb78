//! Dataset types for planilla.
//!
//! Provides the [`TabularDataset`] type: the in-memory representation of
//! parsed CSV data, backed by Arrow `RecordBatch`es.

use std::{path::Path, sync::Arc};

use arrow::{
    array::RecordBatch,
    datatypes::{DataType, Field, Schema, SchemaRef},
};

use crate::error::{Error, Result};

/// An in-memory tabular dataset backed by Arrow RecordBatches.
///
/// This is the transient value produced by reading a CSV source and
/// consumed once by the workbook writer. Column types are inferred per
/// column from cell contents (integer, float, boolean, or string); empty
/// cells map to Arrow nulls. Column names are taken verbatim from the
/// header row and need not be unique — duplicates are preserved as given.
///
/// # Example
///
/// ```no_run
/// use planilla::TabularDataset;
///
/// let dataset = TabularDataset::from_csv("data.csv").unwrap();
/// println!("Dataset has {} rows", dataset.len());
/// ```
#[derive(Debug, Clone)]
pub struct TabularDataset {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

impl TabularDataset {
    /// Creates a new TabularDataset from a schema and its RecordBatches.
    ///
    /// A dataset with zero batches is valid: it models a header-only CSV
    /// (column names, no data rows).
    ///
    /// # Errors
    ///
    /// Returns an error if any batch's schema differs from `schema`.
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for (i, batch) in batches.iter().enumerate() {
            if batch.schema() != schema {
                return Err(Error::unexpected(format!(
                    "Batch {} has a different schema than the dataset",
                    i
                )));
            }
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates a TabularDataset from a single RecordBatch.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        Self::new(schema, vec![batch])
    }

    /// Loads a dataset from a CSV file.
    ///
    /// The file is read fully into memory; the first line is treated as
    /// the header row and fields follow RFC-4180 quoting rules (quoted
    /// fields may contain delimiters and newlines, an embedded quote is
    /// escaped by doubling it).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceInvalid`] if the file cannot be opened or
    /// is not valid CSV.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a dataset from a CSV file with options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceInvalid`] if the file cannot be opened or
    /// parsing fails.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::source_invalid(path, e.to_string()))?;
        let mut buf_reader = BufReader::new(file);

        // The schema must hold for every row, so infer over the whole file.
        let mut format = Format::default().with_header(options.has_header);
        if let Some(delim) = options.delimiter {
            format = format.with_delimiter(delim);
        }
        let (inferred, _) = format
            .infer_schema(&mut buf_reader, None)
            .map_err(|e| Error::source_invalid(path, format!("not valid CSV: {e}")))?;

        // Reset file position
        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::source_invalid(path, e.to_string()))?;

        let schema = Arc::new(normalize_inferred_schema(inferred));
        if schema.fields().is_empty() {
            return Err(Error::source_invalid(path, "no columns found in CSV header"));
        }

        let mut builder = ReaderBuilder::new(Arc::clone(&schema))
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);

        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let reader = builder
            .build(buf_reader)
            .map_err(|e| Error::source_invalid(path, format!("not valid CSV: {e}")))?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::source_invalid(path, format!("not valid CSV: {e}")))?;

        Self::new(schema, batches)
    }

    /// Loads a dataset from a CSV string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceInvalid`] (without a path) if the string is
    /// not valid CSV.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let mut cursor_for_infer = Cursor::new(data.as_bytes());
        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(&mut cursor_for_infer, None)
            .map_err(|e| Error::source_invalid_no_path(format!("not valid CSV: {e}")))?;

        let schema = Arc::new(normalize_inferred_schema(inferred));
        if schema.fields().is_empty() {
            return Err(Error::source_invalid_no_path("no columns found in CSV header"));
        }

        let cursor = Cursor::new(data.as_bytes());
        let builder = ReaderBuilder::new(Arc::clone(&schema))
            .with_batch_size(8192)
            .with_header(true);

        let reader = builder
            .build(cursor)
            .map_err(|e| Error::source_invalid_no_path(format!("not valid CSV: {e}")))?;

        let batches: Vec<RecordBatch> = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::source_invalid_no_path(format!("not valid CSV: {e}")))?;

        Self::new(schema, batches)
    }

    /// Returns the total number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Returns true if the dataset contains no data rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// Returns the schema of the dataset.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Returns the column names, verbatim and in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    /// Returns the number of batches in the dataset.
    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    /// Returns the underlying batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Consumes the dataset and returns the underlying batches.
    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    /// Returns an iterator over the RecordBatches in the dataset.
    pub fn iter(&self) -> impl Iterator<Item = &RecordBatch> {
        self.batches.iter()
    }
}

/// Columns with no observed values infer as `Null`; carry them as
/// nullable text so they read back and serialize like any other column.
fn normalize_inferred_schema(schema: Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| {
            if field.data_type() == &DataType::Null {
                Field::new(field.name().clone(), DataType::Utf8, true)
            } else {
                field.as_ref().clone()
            }
        })
        .collect();
    Schema::new(fields)
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row.
    pub has_header: bool,
    /// Delimiter character (default is comma).
    pub delimiter: Option<u8>,
    /// Batch size for reading.
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None, // Use default comma
            batch_size: 8192,
        }
    }
}

impl CsvOptions {
    /// Creates new CSV options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the file has a header row.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the delimiter character.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets the batch size for reading.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}
