use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::input::multi::ExperimentMeta;
use crate::input::{Cell, RawTable};
use crate::model::assay::columns;
use crate::model::summary::{FlatRow, FlatTable};

const SHEET_NAME_MAX: usize = 31;
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

fn flat_row_cells(row: &FlatRow) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(row.values.len() + 4);
    cells.push(Cell::Text(row.loaded.clone()));
    cells.extend(row.values.iter().map(|v| v.map(Cell::Number).unwrap_or(Cell::Empty)));
    cells.push(Cell::Number(row.n_loaded as f64));
    cells.push(Cell::Number(row.detection_pct));
    cells.push(Cell::Text(row.channel.clone()));
    cells
}

/// Flat summary as typed cells: numbers stay numeric, missing stats stay blank.
pub fn flat_table_cells(flat: &FlatTable) -> RawTable {
    RawTable {
        columns: flat.columns.clone(),
        rows: flat.rows.iter().map(flat_row_cells).collect(),
    }
}

pub fn multi_summary_cells(rows: &[(&ExperimentMeta, &FlatTable)]) -> RawTable {
    let mut header = vec![
        columns::EXPERIMENT_ID.to_string(),
        columns::EXPERIMENT_NAME.to_string(),
        columns::DEVICE.to_string(),
    ];
    if let Some((_, flat)) = rows.first() {
        header.extend(flat.columns.iter().cloned());
    }
    let mut out = Vec::new();
    for (meta, flat) in rows {
        for row in &flat.rows {
            let mut cells = vec![
                Cell::Text(meta.id.clone()),
                Cell::Text(meta.name.clone()),
                Cell::Text(meta.device.clone()),
            ];
            cells.extend(flat_row_cells(row));
            out.push(cells);
        }
    }
    RawTable {
        columns: header,
        rows: out,
    }
}

/// Worksheet name Excel accepts: forbidden characters replaced, at most 31 chars,
/// unique among `used` ignoring case.
pub fn sheet_name(name: &str, used: &[String]) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if SHEET_NAME_FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(SHEET_NAME_MAX).collect()
    };

    let taken = |candidate: &str| used.iter().any(|u| u.eq_ignore_ascii_case(candidate));
    if !taken(&base) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let suffix = format!("_{n}");
        let keep = SHEET_NAME_MAX.saturating_sub(suffix.len());
        let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// One worksheet per `(name, table)`; the header row is bold.
pub fn write_workbook(path: &Path, sheets: &[(&str, &RawTable)]) -> Result<Vec<String>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let mut names: Vec<String> = Vec::with_capacity(sheets.len());

    for (name, table) in sheets {
        let name = sheet_name(name, &names);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name.as_str())?;

        for (c, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_index(c)?, header.as_str(), &bold)?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            let r = row_index(r + 1)?;
            for (c, cell) in row.iter().enumerate() {
                let c = col_index(c)?;
                match cell {
                    Cell::Empty => {}
                    Cell::Number(v) => {
                        worksheet.write_number(r, c, *v)?;
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s.as_str())?;
                    }
                }
            }
        }
        names.push(name);
    }

    workbook.save(path)?;
    tracing::debug!("workbook {} has sheets {}", path.display(), names.join(", "));
    Ok(names)
}

fn row_index(r: usize) -> Result<u32, XlsxError> {
    u32::try_from(r).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_index(c: usize) -> Result<u16, XlsxError> {
    u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)
}
