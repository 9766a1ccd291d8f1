use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::input::multi::ExperimentMeta;
use crate::input::{Cell, RawTable};
use crate::model::assay::columns;
use crate::model::summary::{FlatRow, FlatTable};
use crate::pipeline::stage2_normalize::NormalizedTable;
use crate::report::{format_f64_6, format_opt};

fn sanitize(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

pub fn flat_row_fields(row: &FlatRow) -> Vec<String> {
    let mut fields = Vec::with_capacity(row.values.len() + 4);
    fields.push(sanitize(&row.loaded));
    fields.extend(row.values.iter().map(|v| format_opt(*v)));
    fields.push(row.n_loaded.to_string());
    fields.push(format_f64_6(row.detection_pct));
    fields.push(sanitize(&row.channel));
    fields
}

pub fn write_flat_tsv(path: &Path, flat: &FlatTable) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", flat.columns.join("\t"))?;
    for row in &flat.rows {
        writeln!(w, "{}", flat_row_fields(row).join("\t"))?;
    }
    w.flush()
}

/// Normalized rows with the `Loaded` column appended.
pub fn full_data_table(table: &NormalizedTable) -> RawTable {
    let mut cols = table.columns.clone();
    cols.push(columns::LOADED.to_string());
    let rows = table
        .records
        .iter()
        .map(|r| {
            let mut row = r.cells.clone();
            row.push(r.loaded.clone().map(Cell::Text).unwrap_or(Cell::Empty));
            row
        })
        .collect();
    RawTable {
        columns: cols,
        rows,
    }
}

pub fn write_table_tsv(path: &Path, table: &RawTable) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header: Vec<String> = table.columns.iter().map(|c| sanitize(c)).collect();
    writeln!(w, "{}", header.join("\t"))?;
    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(|c| sanitize(&c.render())).collect();
        writeln!(w, "{}", fields.join("\t"))?;
    }
    w.flush()
}

pub fn write_multi_summary_tsv(
    path: &Path,
    rows: &[(&ExperimentMeta, &FlatTable)],
) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);

    let mut header = vec![
        columns::EXPERIMENT_ID.to_string(),
        columns::EXPERIMENT_NAME.to_string(),
        columns::DEVICE.to_string(),
    ];
    if let Some((_, flat)) = rows.first() {
        header.extend(flat.columns.iter().cloned());
    }
    writeln!(w, "{}", header.join("\t"))?;

    for (meta, flat) in rows {
        for row in &flat.rows {
            let mut fields = vec![sanitize(&meta.id), sanitize(&meta.name), sanitize(&meta.device)];
            fields.extend(flat_row_fields(row));
            writeln!(w, "{}", fields.join("\t"))?;
        }
    }
    w.flush()
}
