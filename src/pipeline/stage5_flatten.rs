use crate::model::assay::{MetricSet, columns};
use crate::model::summary::{ChannelSummary, FlatRow, FlatTable};

pub const MEAN_SUFFIX: &str = "mean";
pub const STD_SUFFIX: &str = "std";
pub const N_LOADED_COLUMN: &str = "QC_N_loaded";
pub const DETECTION_COLUMN: &str = "Detection_%";

pub fn flat_columns(metrics: &MetricSet) -> Vec<String> {
    let mut out = Vec::with_capacity(metrics.len() * 2 + 4);
    out.push(columns::LOADED.to_string());
    for name in &metrics.names {
        out.push(format!("{name}_{MEAN_SUFFIX}"));
        out.push(format!("{name}_{STD_SUFFIX}"));
    }
    out.push(N_LOADED_COLUMN.to_string());
    out.push(DETECTION_COLUMN.to_string());
    out.push(columns::CHANNEL.to_string());
    out
}

pub fn flatten_summary(summary: &ChannelSummary) -> FlatTable {
    let rows = summary
        .conditions
        .iter()
        .map(|c| FlatRow {
            loaded: c.loaded.clone(),
            values: c.stats.iter().flat_map(|s| [s.mean, s.std]).collect(),
            n_loaded: c.n_loaded,
            detection_pct: c.detection_pct,
            channel: summary.channel.clone(),
        })
        .collect();

    FlatTable {
        columns: flat_columns(&summary.metrics),
        rows,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_flatten.rs"]
mod tests;
