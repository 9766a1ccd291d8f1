use crate::input::{Cell, InputError, RawTable};
use crate::model::assay::{MetricSet, columns};
use crate::model::record::MeasurementRecord;
use crate::pipeline::stage1_layout::PlateLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub metrics: MetricSet,
    pub records: Vec<MeasurementRecord>,
}

impl NormalizedTable {
    pub fn n_unmapped(&self) -> usize {
        self.records.iter().filter(|r| r.loaded.is_none()).count()
    }
}

#[derive(Debug, Clone)]
struct ColumnIndex {
    sample: usize,
    well: usize,
    channel: usize,
    assay: Option<usize>,
    classification: usize,
    metrics: Vec<usize>,
}

pub fn canonical_column_name(raw: &str) -> String {
    raw.trim().replace(' ', "_")
}

pub fn normalize_records(
    table: &RawTable,
    layout: &PlateLayout,
    extra_metrics: &[String],
) -> Result<NormalizedTable, InputError> {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| canonical_column_name(c))
        .collect();

    let metrics = resolve_metrics(table, &columns, extra_metrics);
    let index = resolve_columns(&columns, &metrics)?;

    let mut rows: Vec<Vec<Cell>> = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(columns.len(), Cell::Empty);
            row
        })
        .collect();
    forward_fill(&mut rows, index.sample);
    forward_fill(&mut rows, index.well);

    let mut records = Vec::with_capacity(rows.len());
    for (row_idx, cells) in rows.into_iter().enumerate() {
        let well = coerce_well(&cells[index.well]);
        let loaded = well.and_then(|w| layout.label_for(w)).map(str::to_string);
        records.push(MeasurementRecord {
            row: row_idx,
            sample: cells[index.sample].as_text(),
            well,
            channel: cells[index.channel].as_text(),
            assay: index.assay.and_then(|i| cells[i].as_text()),
            classification: cells[index.classification].as_text(),
            metrics: index.metrics.iter().map(|&i| cells[i].as_f64()).collect(),
            loaded,
            cells,
        });
    }

    let normalized = NormalizedTable {
        columns,
        metrics,
        records,
    };
    let unmapped = normalized.n_unmapped();
    if unmapped > 0 {
        tracing::warn!(
            "{} of {} rows have no layout label (well missing or outside the layout)",
            unmapped,
            normalized.records.len()
        );
    }
    Ok(normalized)
}

fn resolve_metrics(table: &RawTable, columns: &[String], extra_metrics: &[String]) -> MetricSet {
    let mut extras = Vec::new();
    for raw in extra_metrics {
        let name = canonical_column_name(raw);
        let Some(idx) = columns.iter().position(|c| *c == name) else {
            tracing::debug!("extra metric {} not present; skipped", name);
            continue;
        };
        let has_values = table
            .rows
            .iter()
            .any(|row| row.get(idx).and_then(Cell::as_f64).is_some());
        if has_values {
            tracing::info!("including extra metric {}", name);
            extras.push(name);
        } else {
            tracing::debug!("extra metric {} has no numeric values; skipped", name);
        }
    }
    MetricSet::with_extras(extras)
}

fn resolve_columns(columns: &[String], metrics: &MetricSet) -> Result<ColumnIndex, InputError> {
    let find = |name: &str| columns.iter().position(|c| c == name);
    let require = |name: &str| {
        find(name).ok_or_else(|| {
            InputError::MissingColumn(format!(
                "{} (found: {})",
                name,
                columns.join(", ")
            ))
        })
    };

    let sample = require(columns::SAMPLE_NAME)?;
    let well = require(columns::WELL_ID)?;
    let channel = require(columns::CHANNEL)?;
    let classification = require(columns::CLASSIFICATION)?;
    let assay = find(columns::ASSAY);
    let metric_idx = metrics
        .names
        .iter()
        .map(|m| require(m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ColumnIndex {
        sample,
        well,
        channel,
        assay,
        classification,
        metrics: metric_idx,
    })
}

/// Missing cells in `col` take the closest non-missing value above them.
pub fn forward_fill(rows: &mut [Vec<Cell>], col: usize) {
    let mut last: Option<Cell> = None;
    for row in rows.iter_mut() {
        let Some(cell) = row.get_mut(col) else {
            continue;
        };
        if cell.is_missing() {
            if let Some(prev) = &last {
                *cell = prev.clone();
            }
        } else {
            last = Some(cell.clone());
        }
    }
}

/// Positive integral well numbers; anything else is treated as missing.
pub fn coerce_well(cell: &Cell) -> Option<u32> {
    let v = cell.as_f64()?;
    if v.fract() != 0.0 || v < 1.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;
