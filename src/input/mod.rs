use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

pub mod delimited;
pub mod layout;
pub mod multi;
pub mod xlsx;

pub use crate::model::record::Cell;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("delimited text error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(String),
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Workbook,
    Tsv,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl FromStr for SheetSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("sheet selector is empty".to_string());
        }
        match trimmed.parse::<usize>() {
            Ok(idx) => Ok(SheetSelector::Index(idx)),
            Err(_) => Ok(SheetSelector::Name(trimmed.to_string())),
        }
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(idx) => write!(f, "#{idx}"),
            SheetSelector::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Header row plus data rows, as read from the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Splits a cell grid into header and rows; rows are padded or cut to the header width.
    pub fn from_grid(mut grid: Vec<Vec<Cell>>) -> Result<Self, InputError> {
        if grid.is_empty() {
            return Err(InputError::Parse("input table has no header row".to_string()));
        }
        let header = grid.remove(0);
        let columns: Vec<String> = header.iter().map(Cell::render).collect();
        let width = columns.len();
        let mut rows = Vec::with_capacity(grid.len());
        for (idx, mut row) in grid.into_iter().enumerate() {
            if row.len() > width {
                if row[width..].iter().any(|c| !c.is_missing()) {
                    tracing::warn!(
                        "row {} has {} cells but the header has {}; extra cells dropped",
                        idx + 2,
                        row.len(),
                        width
                    );
                }
                row.truncate(width);
            }
            row.resize(width, Cell::Empty);
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }
}

pub fn detect_format(path: &Path) -> Result<InputFormat, InputError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let ext = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
            if path.extension().is_some_and(|e| e == "gz") {
                return Err(InputError::UnsupportedFormat(format!(
                    "compressed workbooks are not supported: {}",
                    path.display()
                )));
            }
            Ok(InputFormat::Workbook)
        }
        "tsv" | "txt" | "tab" => Ok(InputFormat::Tsv),
        "csv" => Ok(InputFormat::Csv),
        _ => Err(InputError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Reads every row of the selected sheet or file, header included.
pub fn load_grid(path: &Path, sheet: &SheetSelector) -> Result<Vec<Vec<Cell>>, InputError> {
    if !path.exists() {
        return Err(InputError::MissingInput(path.display().to_string()));
    }
    let format = detect_format(path)?;
    tracing::debug!("reading {} as {:?}", path.display(), format);
    match format {
        InputFormat::Workbook => xlsx::read_sheet(path, sheet),
        InputFormat::Tsv => delimited::read_delimited(path, b'\t'),
        InputFormat::Csv => delimited::read_delimited(path, b','),
    }
}

pub fn load_table(path: &Path, sheet: &SheetSelector) -> Result<RawTable, InputError> {
    let table = RawTable::from_grid(load_grid(path, sheet)?)?;
    tracing::info!(
        "loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
