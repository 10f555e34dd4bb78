//! Integration tests for planilla.
//!
//! Every test writes a CSV fixture, converts it, and reads the produced
//! workbook back with calamine to verify what actually landed on disk.

#![allow(clippy::uninlined_format_args, clippy::float_cmp)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use calamine::{open_workbook, Data, Reader, Xlsx};
use planilla::{convert, convert_with_options, ConvertOptions, Error, DEFAULT_SHEET_NAME};

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents)
        .ok()
        .unwrap_or_else(|| panic!("Should write CSV fixture"));
    path
}

fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .ok()
        .unwrap_or_else(|| panic!("Should open workbook"));
    let range = workbook
        .worksheet_range(sheet)
        .ok()
        .unwrap_or_else(|| panic!("Should read worksheet"));
    range.rows().map(<[Data]>::to_vec).collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => panic!("Expected text cell, got {:?}", other),
    }
}

fn cell_number(cell: &Data) -> f64 {
    match cell {
        Data::Int(v) => *v as f64,
        Data::Float(v) => *v,
        other => panic!("Expected numeric cell, got {:?}", other),
    }
}

#[test]
fn test_convert_preserves_shape() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(
        temp_dir.path(),
        "scores.csv",
        "id,name,score\n1,ana,9.5\n2,luis,8.0\n3,eva,7.25\n",
    );
    let output = temp_dir.path().join("scores.xlsx");

    let summary = convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.columns, 3);

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    // header + 3 data rows, 3 columns each
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.len(), 3);
    }
}

#[test]
fn test_header_row_verbatim_with_duplicates() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "dup.csv", "b,a,b\n1,2,3\n");
    let output = temp_dir.path().join("dup.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    let header: Vec<String> = rows[0].iter().map(cell_text).collect();
    assert_eq!(header, vec!["b", "a", "b"]);
}

#[test]
fn test_quoted_fields_survive() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(
        temp_dir.path(),
        "quotes.csv",
        "name,quote\n\"a,b\",\"She said \"\"hi\"\"\"\n",
    );
    let output = temp_dir.path().join("quotes.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(cell_text(&rows[1][0]), "a,b");
    assert_eq!(cell_text(&rows[1][1]), "She said \"hi\"");
}

#[test]
fn test_cell_types_preserved() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(
        temp_dir.path(),
        "typed.csv",
        "n,f,b,s\n1,1.5,true,x\n2,2.5,false,y\n",
    );
    let output = temp_dir.path().join("typed.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(cell_number(&rows[1][0]), 1.0);
    assert_eq!(cell_number(&rows[1][1]), 1.5);
    assert_eq!(rows[1][2], Data::Bool(true));
    assert_eq!(rows[2][2], Data::Bool(false));
    assert_eq!(cell_text(&rows[1][3]), "x");
}

#[test]
fn test_empty_cells_become_blank() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "gaps.csv", "a,b\n1,\n2,x\n");
    let output = temp_dir.path().join("gaps.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(rows[1][1], Data::Empty);
    assert_eq!(cell_text(&rows[2][1]), "x");
}

#[test]
fn test_header_only_csv() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "empty.csv", "a,b,c\n");
    let output = temp_dir.path().join("empty.xlsx");

    let summary = convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Header-only CSV should convert"));
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.columns, 3);

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(rows.len(), 1);
    let header: Vec<String> = rows[0].iter().map(cell_text).collect();
    assert_eq!(header, vec!["a", "b", "c"]);
}

#[test]
fn test_round_trip_values() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(
        temp_dir.path(),
        "mixed.csv",
        "city,population,density,coastal\nLima,11000000,3200.5,true\nCusco,430000,1100.0,false\n",
    );
    let output = temp_dir.path().join("mixed.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(cell_text(&rows[1][0]), "Lima");
    assert_eq!(cell_number(&rows[1][1]), 11_000_000.0);
    assert_eq!(cell_number(&rows[1][2]), 3200.5);
    assert_eq!(rows[1][3], Data::Bool(true));
    assert_eq!(cell_text(&rows[2][0]), "Cusco");
    assert_eq!(cell_number(&rows[2][1]), 430_000.0);
    assert_eq!(cell_number(&rows[2][2]), 1100.0);
    assert_eq!(rows[2][3], Data::Bool(false));
}

#[test]
fn test_custom_sheet_name() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "in.csv", "a\n1\n");
    let output = temp_dir.path().join("out.xlsx");

    convert_with_options(
        &input,
        &output,
        &ConvertOptions::new().with_sheet_name("Datos"),
    )
    .ok()
    .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, "Datos");
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_sheet_name_is_sanitized() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "in.csv", "a\n1\n");
    let output = temp_dir.path().join("out.xlsx");

    convert_with_options(
        &input,
        &output,
        &ConvertOptions::new().with_sheet_name("ventas: 2024"),
    )
    .ok()
    .unwrap_or_else(|| panic!("Should convert"));

    let workbook: Xlsx<_> = open_workbook(&output)
        .ok()
        .unwrap_or_else(|| panic!("Should open workbook"));
    assert_eq!(workbook.sheet_names(), vec!["ventas_ 2024"]);
}

#[test]
fn test_custom_delimiter() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "semi.csv", "a;b\n1;two\n");
    let output = temp_dir.path().join("semi.xlsx");

    convert_with_options(&input, &output, &ConvertOptions::new().with_delimiter(b';'))
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    let header: Vec<String> = rows[0].iter().map(cell_text).collect();
    assert_eq!(header, vec!["a", "b"]);
    assert_eq!(cell_number(&rows[1][0]), 1.0);
    assert_eq!(cell_text(&rows[1][1]), "two");
}

#[test]
fn test_missing_source_creates_no_output() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let output = temp_dir.path().join("out.xlsx");

    let result = convert(temp_dir.path().join("missing.csv"), &output);
    assert!(matches!(result, Err(Error::SourceInvalid { .. })));
    assert!(!output.exists());
}

#[test]
fn test_missing_source_does_not_modify_existing_output() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let output = temp_dir.path().join("out.xlsx");
    fs::write(&output, b"previous contents")
        .ok()
        .unwrap_or_else(|| panic!("Should write placeholder"));

    let result = convert(temp_dir.path().join("missing.csv"), &output);
    assert!(matches!(result, Err(Error::SourceInvalid { .. })));

    let contents = fs::read(&output)
        .ok()
        .unwrap_or_else(|| panic!("Should read output"));
    assert_eq!(contents, b"previous contents");
}

#[test]
fn test_invalid_destination_leaves_no_partial_file() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "in.csv", "a,b\n1,2\n");
    let output = temp_dir.path().join("no_such_dir").join("out.xlsx");

    let result = convert(&input, &output);
    assert!(matches!(result, Err(Error::DestinationInvalid { .. })));
    assert!(!output.exists());
    assert!(!output
        .parent()
        .map(Path::exists)
        .unwrap_or_else(|| panic!("Output should have a parent")));
}

#[test]
fn test_overwrites_existing_output() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(temp_dir.path(), "in.csv", "a\nfirst\n");
    let output = temp_dir.path().join("out.xlsx");
    fs::write(&output, b"stale bytes that are not a workbook")
        .ok()
        .unwrap_or_else(|| panic!("Should write placeholder"));

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should overwrite"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(rows.len(), 2);
    assert_eq!(cell_text(&rows[1][0]), "first");
}

#[test]
fn test_multiline_quoted_field() {
    let temp_dir = tempfile::tempdir()
        .ok()
        .unwrap_or_else(|| panic!("Should create temp dir"));
    let input = write_csv(
        temp_dir.path(),
        "multiline.csv",
        "id,note\n1,\"line one\nline two\"\n",
    );
    let output = temp_dir.path().join("multiline.xlsx");

    convert(&input, &output)
        .ok()
        .unwrap_or_else(|| panic!("Should convert"));

    let rows = read_sheet(&output, DEFAULT_SHEET_NAME);
    assert_eq!(rows.len(), 2);
    assert_eq!(cell_text(&rows[1][1]), "line one\nline two");
}
