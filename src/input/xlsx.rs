use std::path::Path;

use calamine::{Data as DataType, Reader, open_workbook_auto};

use crate::input::{Cell, InputError, SheetSelector};

pub fn read_sheet(path: &Path, sheet: &SheetSelector) -> Result<Vec<Vec<Cell>>, InputError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| InputError::Workbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let index = match sheet {
        SheetSelector::Index(idx) => *idx,
        SheetSelector::Name(name) => sheet_names
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| {
                InputError::MissingInput(format!(
                    "worksheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ))
            })?,
    };

    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| InputError::MissingInput(format!("worksheet #{} not found", index)))?
        .map_err(|e| InputError::Workbook(e.to_string()))?;

    tracing::debug!(
        "worksheet {} ({}) spans {:?}",
        index,
        sheet_names.get(index).map(String::as_str).unwrap_or("?"),
        range.get_size()
    );

    let grid = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect::<Vec<Vec<Cell>>>();

    if grid.is_empty() {
        return Err(InputError::Parse("worksheet is empty".to_string()));
    }
    Ok(grid)
}

pub fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) if f.is_finite() => Cell::Number(*f),
        DataType::Float(_) => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/xlsx.rs"]
mod tests;
