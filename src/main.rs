//! planilla CLI - CSV to Excel Workbook Conversion
//!
//! Command-line interface for planilla operations.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::uninlined_format_args)]

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use arrow::util::pretty::print_batches;
use clap::{Parser, Subcommand};
use planilla::{convert_with_options, ensure_xlsx_extension, ConvertOptions, TabularDataset};

/// planilla - CSV to Excel Workbook Conversion in Pure Rust
#[derive(Parser)]
#[command(name = "planilla")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file into an XLSX workbook
    Convert {
        /// Input CSV file path
        input: PathBuf,
        /// Output workbook path (`.xlsx` appended when missing)
        #[arg(conflicts_with_all = ["out_dir", "name"])]
        output: Option<PathBuf>,
        /// Destination folder for the workbook
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Base file name for the workbook (defaults to the input stem)
        #[arg(long)]
        name: Option<String>,
        /// Worksheet name
        #[arg(long)]
        sheet: Option<String>,
        /// Field delimiter (single ASCII character)
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Output format for the summary (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Display CSV file information
    Info {
        /// Path to CSV file
        path: PathBuf,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Display first N rows of a CSV file
    Head {
        /// Path to CSV file
        path: PathBuf,
        /// Number of rows to display
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },
    /// Display the inferred schema of a CSV file
    Schema {
        /// Path to CSV file
        path: PathBuf,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            out_dir,
            name,
            sheet,
            delimiter,
            format,
        } => cmd_convert(
            &input,
            output,
            &out_dir,
            name.as_deref(),
            sheet.as_deref(),
            delimiter,
            &format,
        ),
        Commands::Info { path, format } => cmd_info(&path, &format),
        Commands::Head { path, rows } => cmd_head(&path, rows),
        Commands::Schema { path, format } => cmd_schema(&path, &format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    out_dir: &Path,
    name: Option<&str>,
    sheet: Option<&str>,
    delimiter: Option<char>,
    format: &str,
) -> planilla::Result<()> {
    let output_path = resolve_output_path(input, output, out_dir, name);

    let mut options = ConvertOptions::new();
    if let Some(delim) = delimiter {
        options = options.with_delimiter(parse_delimiter(delim)?);
    }
    if let Some(sheet) = sheet {
        options = options.with_sheet_name(sheet);
    }

    let summary = convert_with_options(input, &output_path, &options)?;

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary)
                .map_err(|e| planilla::Error::unexpected(e.to_string()))?
        );
    } else {
        println!(
            "Converted {} -> {} ({} rows, {} columns)",
            input.display(),
            summary.output.display(),
            summary.rows,
            summary.columns
        );
    }

    Ok(())
}

fn cmd_info(path: &Path, format: &str) -> planilla::Result<()> {
    let dataset = TabularDataset::from_csv(path)?;

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    if format == "json" {
        let json = serde_json::json!({
            "path": path.display().to_string(),
            "rows": dataset.len(),
            "columns": dataset.num_columns(),
            "batches": dataset.num_batches(),
            "size_bytes": file_size,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json)
                .map_err(|e| planilla::Error::unexpected(e.to_string()))?
        );
    } else {
        println!("File: {}", path.display());
        println!("Rows: {}", dataset.len());
        println!("Columns: {}", dataset.num_columns());
        println!("Batches: {}", dataset.num_batches());
        println!("Size: {} bytes", file_size);
    }

    Ok(())
}

fn cmd_head(path: &Path, rows: usize) -> planilla::Result<()> {
    let dataset = TabularDataset::from_csv(path)?;

    if dataset.is_empty() {
        println!("Dataset is empty");
        return Ok(());
    }

    // Collect rows into batches
    let mut collected = Vec::new();
    let mut count = 0;

    for batch in dataset.iter() {
        let take = (rows - count).min(batch.num_rows());
        if take > 0 {
            collected.push(batch.slice(0, take));
            count += take;
        }
        if count >= rows {
            break;
        }
    }

    // Print using Arrow's pretty printer
    print_batches(&collected).map_err(|e| planilla::Error::unexpected(e.to_string()))?;

    if count < dataset.len() {
        println!("... showing {} of {} rows", count, dataset.len());
    }

    Ok(())
}

fn cmd_schema(path: &Path, format: &str) -> planilla::Result<()> {
    let dataset = TabularDataset::from_csv(path)?;
    let schema = dataset.schema();

    if format == "json" {
        let json = serde_json::json!({
            "path": path.display().to_string(),
            "columns": schema.fields().iter().map(|field| {
                serde_json::json!({
                    "name": field.name(),
                    "data_type": field.data_type().to_string(),
                    "nullable": field.is_nullable(),
                })
            }).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json)
                .map_err(|e| planilla::Error::unexpected(e.to_string()))?
        );
    } else {
        println!("Schema for {}:", path.display());
        println!();

        for (i, field) in schema.fields().iter().enumerate() {
            let nullable = if field.is_nullable() {
                "nullable"
            } else {
                "not null"
            };
            println!(
                "  {}: {} ({}) [{}]",
                i,
                field.name(),
                field.data_type(),
                nullable
            );
        }

        println!();
        println!("Total columns: {}", schema.fields().len());
    }

    Ok(())
}

fn resolve_output_path(
    input: &Path,
    output: Option<PathBuf>,
    out_dir: &Path,
    name: Option<&str>,
) -> PathBuf {
    if let Some(output) = output {
        return ensure_xlsx_extension(output);
    }

    let stem = name
        .map(ToString::to_string)
        .or_else(|| input.file_stem().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| "output".to_string());

    ensure_xlsx_extension(out_dir.join(stem))
}

fn parse_delimiter(delimiter: char) -> planilla::Result<u8> {
    u8::try_from(delimiter).map_err(|_| {
        planilla::Error::unexpected(format!(
            "delimiter must be a single ASCII character, got '{delimiter}'"
        ))
    })
}
