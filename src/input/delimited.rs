use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;

use crate::input::{Cell, InputError};

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<Vec<Cell>>, InputError> {
    let reader = open_maybe_gz(path)?;
    parse_delimited(reader, delimiter)
}

/// Quoted fields may span lines; rows of whitespace-only fields after the header are skipped.
pub fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Vec<Cell>>, InputError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if grid.is_empty() {
            let row = record
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    if i == 0 {
                        parse_cell(field.trim_start_matches('\u{feff}'))
                    } else {
                        parse_cell(field)
                    }
                })
                .collect();
            grid.push(row);
            continue;
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        grid.push(record.iter().map(parse_cell).collect());
    }

    if grid.is_empty() {
        return Err(InputError::Parse("input file is empty".to_string()));
    }
    Ok(grid)
}

pub fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Text(raw.to_string()),
    }
}
