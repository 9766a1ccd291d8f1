use serde::Serialize;

use crate::model::assay::MetricSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSummary {
    pub loaded: String,
    /// Aligned with the owning summary's `MetricSet`.
    pub stats: Vec<MetricStats>,
    pub n_loaded: usize,
    pub n_positive: usize,
    pub detection_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: String,
    pub metrics: MetricSet,
    pub conditions: Vec<ConditionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub loaded: String,
    /// `mean`, `std` pairs in metric order.
    pub values: Vec<Option<f64>>,
    pub n_loaded: usize,
    pub detection_pct: f64,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
