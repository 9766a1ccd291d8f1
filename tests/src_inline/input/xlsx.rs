use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use calamine::Data as DataType;
use rust_xlsxwriter::Workbook;

use super::*;
use crate::input::{InputFormat, detect_format, load_table};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_qpcrqc_xlsx_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Two sheets: a notes sheet first, then the instrument export.
fn write_fixture(path: &Path) {
    let mut workbook = Workbook::new();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "run notes").unwrap();

    let export = workbook.add_worksheet();
    export.set_name("Results").unwrap();
    let header = ["Sample Name", "Well ID", "Channel", "Cq", "Ampl.", "Slope", "Classification"];
    for (c, h) in header.iter().enumerate() {
        export.write_string(0, c as u16, *h).unwrap();
    }
    export.write_string(1, 0, "S1").unwrap();
    export.write_number(1, 1, 1.0).unwrap();
    export.write_string(1, 2, "CH2").unwrap();
    export.write_number(1, 3, 20.5).unwrap();
    export.write_number(1, 4, 1200.0).unwrap();
    export.write_number(1, 5, 0.8).unwrap();
    export.write_string(1, 6, "POSITIVE").unwrap();
    export.write_number(2, 1, 2.0).unwrap();
    export.write_string(2, 2, "CH3").unwrap();
    export.write_number(2, 3, -1.0).unwrap();
    export.write_boolean(2, 6, false).unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn test_convert_cell_variants() {
    assert_eq!(convert_cell(&DataType::Empty), Cell::Empty);
    assert_eq!(convert_cell(&DataType::Int(3)), Cell::Number(3.0));
    assert_eq!(convert_cell(&DataType::Float(20.5)), Cell::Number(20.5));
    assert_eq!(convert_cell(&DataType::Float(f64::NAN)), Cell::Empty);
    assert_eq!(convert_cell(&DataType::Float(f64::INFINITY)), Cell::Empty);
    assert_eq!(
        convert_cell(&DataType::String("CH2".to_string())),
        Cell::Text("CH2".to_string())
    );
    assert_eq!(convert_cell(&DataType::Bool(true)), Cell::Text("TRUE".to_string()));
    assert_eq!(convert_cell(&DataType::Bool(false)), Cell::Text("FALSE".to_string()));
}

#[test]
fn test_read_sheet_by_name_and_index() {
    let dir = make_temp_dir();
    let path = dir.join("plate.xlsx");
    write_fixture(&path);
    assert_eq!(detect_format(&path).unwrap(), InputFormat::Workbook);

    let by_name = load_table(&path, &SheetSelector::Name("Results".to_string())).unwrap();
    let by_index = load_table(&path, &SheetSelector::Index(1)).unwrap();
    assert_eq!(by_name, by_index);

    assert_eq!(by_name.columns[0], "Sample Name");
    assert_eq!(by_name.n_rows(), 2);
    assert_eq!(by_name.rows[0][0], Cell::Text("S1".to_string()));
    assert_eq!(by_name.rows[0][3], Cell::Number(20.5));
    assert_eq!(by_name.rows[1][0], Cell::Empty);
    assert_eq!(by_name.rows[1][3], Cell::Number(-1.0));
    assert_eq!(by_name.rows[1][6], Cell::Text("FALSE".to_string()));
}

#[test]
fn test_default_sheet_is_first() {
    let dir = make_temp_dir();
    let path = dir.join("plate.xlsx");
    write_fixture(&path);
    let grid = read_sheet(&path, &SheetSelector::default()).unwrap();
    assert_eq!(grid, vec![vec![Cell::Text("run notes".to_string())]]);
}

#[test]
fn test_unknown_sheet_name_is_missing_input() {
    let dir = make_temp_dir();
    let path = dir.join("plate.xlsx");
    write_fixture(&path);
    let err = read_sheet(&path, &SheetSelector::Name("Plate 9".to_string())).unwrap_err();
    match err {
        InputError::MissingInput(msg) => {
            assert!(msg.contains("Plate 9"));
            assert!(msg.contains("Notes, Results"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sheet_index_out_of_range_is_missing_input() {
    let dir = make_temp_dir();
    let path = dir.join("plate.xlsx");
    write_fixture(&path);
    assert!(matches!(
        read_sheet(&path, &SheetSelector::Index(5)),
        Err(InputError::MissingInput(_))
    ));
}

#[test]
fn test_corrupt_workbook_is_workbook_error() {
    let dir = make_temp_dir();
    let path = dir.join("broken.xlsx");
    fs::write(&path, b"not a zip archive").unwrap();
    assert!(matches!(
        read_sheet(&path, &SheetSelector::default()),
        Err(InputError::Workbook(_))
    ));
}
