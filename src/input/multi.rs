use serde::Serialize;

use crate::input::{Cell, InputError, RawTable};
use crate::model::assay::columns;

const ID_PREFIX: &str = "ID:";
const NAME_PREFIX: &str = "Name:";
const DEVICE_PREFIX: &str = "Device:";
const HEADER_MARKER: &str = "Sample Name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentMeta {
    pub id: String,
    pub name: String,
    pub device: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentBlock {
    pub meta: ExperimentMeta,
    pub table: RawTable,
}

/// Splits a headerless sheet into experiment blocks, each starting at an `ID:` row.
pub fn split_experiments(grid: &[Vec<Cell>]) -> Result<Vec<ExperimentBlock>, InputError> {
    let mut starts: Vec<usize> = grid
        .iter()
        .enumerate()
        .filter(|(_, row)| first_text(row).is_some_and(|s| s.starts_with(ID_PREFIX)))
        .map(|(idx, _)| idx)
        .collect();
    if starts.is_empty() {
        return Err(InputError::Parse(
            "no experiment blocks found (expected rows starting with 'ID:')".to_string(),
        ));
    }
    starts.push(grid.len());

    let mut blocks = Vec::with_capacity(starts.len() - 1);
    for pair in starts.windows(2) {
        blocks.push(parse_block(&grid[pair[0]..pair[1]])?);
    }
    Ok(blocks)
}

fn parse_block(block: &[Vec<Cell>]) -> Result<ExperimentBlock, InputError> {
    let id = first_text(&block[0])
        .map(|s| strip_label(&s, ID_PREFIX))
        .unwrap_or_default();
    let name = find_labelled(block, NAME_PREFIX).unwrap_or_else(|| {
        tracing::warn!("experiment {} has no 'Name:' row", id);
        String::new()
    });
    let device = find_labelled(block, DEVICE_PREFIX).unwrap_or_else(|| {
        tracing::warn!("experiment {} has no 'Device:' row", id);
        String::new()
    });

    let header_idx = block
        .iter()
        .position(|row| first_text(row).as_deref() == Some(HEADER_MARKER))
        .ok_or_else(|| {
            InputError::Parse(format!(
                "experiment {} has no '{}' header row",
                id, HEADER_MARKER
            ))
        })?;

    let mut grid = Vec::with_capacity(block.len() - header_idx);
    grid.push(block[header_idx].clone());
    for row in &block[header_idx + 1..] {
        if row.iter().all(Cell::is_missing) {
            continue;
        }
        grid.push(row.clone());
    }
    let mut table = RawTable::from_grid(grid)?;

    table.columns.push(columns::EXPERIMENT_ID.to_string());
    table.columns.push(columns::EXPERIMENT_NAME.to_string());
    table.columns.push(columns::DEVICE.to_string());
    for row in &mut table.rows {
        row.push(Cell::Text(id.clone()));
        row.push(Cell::Text(name.clone()));
        row.push(Cell::Text(device.clone()));
    }

    tracing::debug!(
        "experiment block {} ({}) has {} data rows",
        id,
        name,
        table.n_rows()
    );

    Ok(ExperimentBlock {
        meta: ExperimentMeta { id, name, device },
        table,
    })
}

fn first_text(row: &[Cell]) -> Option<String> {
    row.first().and_then(Cell::as_text)
}

fn strip_label(value: &str, prefix: &str) -> String {
    value.replacen(prefix, "", 1).trim().to_string()
}

fn find_labelled(block: &[Vec<Cell>], prefix: &str) -> Option<String> {
    block
        .iter()
        .filter_map(|row| first_text(row))
        .find(|s| s.starts_with(prefix))
        .map(|s| strip_label(&s, prefix))
}

/// Stacks tables by column name; the column order is first-seen, missing cells stay empty.
pub fn concat_tables<'a, I>(tables: I) -> RawTable
where
    I: IntoIterator<Item = &'a RawTable>,
{
    let tables: Vec<&RawTable> = tables.into_iter().collect();
    let mut columns: Vec<String> = Vec::new();
    for table in &tables {
        for name in &table.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for table in &tables {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|name| table.columns.iter().position(|c| c == name))
            .collect();
        for row in &table.rows {
            rows.push(
                positions
                    .iter()
                    .map(|pos| pos.and_then(|p| row.get(p).cloned()).unwrap_or(Cell::Empty))
                    .collect(),
            );
        }
    }
    RawTable { columns, rows }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/multi.rs"]
mod tests;
