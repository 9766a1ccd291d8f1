pub mod stage1_layout;
pub mod stage2_normalize;
pub mod stage3_channels;
pub mod stage4_aggregate;
pub mod stage5_flatten;
pub mod stage6_report;

use thiserror::Error;

use crate::input::multi::{ExperimentBlock, ExperimentMeta};
use crate::input::{InputError, RawTable};
use crate::model::assay::{CQ_UNDETERMINED, ChannelSelection, GREEN_ENDPOINT_COLUMN, POSITIVE_LABEL};
use crate::model::summary::{ChannelSummary, FlatTable};
use stage1_layout::{LayoutError, PlateLayout, validate_layout};
use stage2_normalize::{NormalizedTable, normalize_records};
use stage3_channels::{ChannelSubset, resolve_channels, split_channels};
use stage4_aggregate::{aggregate_channel, conditions_without_data};
use stage5_flatten::flatten_summary;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub positive_label: String,
    pub channels: ChannelSelection,
    pub extra_metrics: Vec<String>,
    pub cq_undetermined: f64,
    pub strict_layout: bool,
}

impl AnalysisParams {
    pub fn default_v1() -> Self {
        Self {
            positive_label: POSITIVE_LABEL.to_string(),
            channels: ChannelSelection::default_v1(),
            extra_metrics: vec![GREEN_ENDPOINT_COLUMN.to_string()],
            cq_undetermined: CQ_UNDETERMINED,
            strict_layout: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResult {
    pub subset: ChannelSubset,
    pub summary: ChannelSummary,
    pub flat: FlatTable,
    pub conditions_without_data: Vec<String>,
}

impl ChannelResult {
    pub fn channel(&self) -> &str {
        &self.subset.channel
    }
}

/// Everything one run produces; consumers only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub layout: PlateLayout,
    pub table: NormalizedTable,
    pub channels: Vec<ChannelResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResult {
    pub meta: ExperimentMeta,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiAnalysisResult {
    pub layout: PlateLayout,
    pub experiments: Vec<ExperimentResult>,
}

/// Checks the layout according to `params` and reports any issues.
pub fn prepare_layout(layout: &PlateLayout, params: &AnalysisParams) -> Result<(), LayoutError> {
    if params.strict_layout {
        validate_layout(layout)?;
    } else {
        for issue in &layout.issues {
            tracing::warn!("{}; mapping may be misaligned", issue);
        }
        if layout.grid.is_empty() {
            tracing::warn!("layout is empty; no well will receive a label");
        }
    }
    tracing::info!(
        "layout: {} rows x {} columns, {} wells mapped",
        layout.n_rows(),
        layout.n_cols,
        layout.n_wells()
    );
    Ok(())
}

pub fn run_analysis(
    table: &RawTable,
    layout: &PlateLayout,
    params: &AnalysisParams,
) -> Result<AnalysisResult, PipelineError> {
    prepare_layout(layout, params)?;
    analyze(table, layout, params)
}

fn analyze(
    table: &RawTable,
    layout: &PlateLayout,
    params: &AnalysisParams,
) -> Result<AnalysisResult, PipelineError> {
    let normalized = normalize_records(table, layout, &params.extra_metrics)?;
    let channels = resolve_channels(&normalized, &params.channels);
    let subsets = split_channels(&normalized, &channels, params.cq_undetermined);

    let mut results = Vec::with_capacity(subsets.len());
    for subset in subsets {
        let summary = aggregate_channel(&subset, &normalized.metrics, &params.positive_label);
        let flat = flatten_summary(&summary);
        let missing = conditions_without_data(&summary, layout);
        if !missing.is_empty() && !subset.records.is_empty() {
            tracing::warn!(
                "{}: layout conditions without data rows: {}",
                subset.channel,
                missing.join(", ")
            );
        }
        results.push(ChannelResult {
            subset,
            summary,
            flat,
            conditions_without_data: missing,
        });
    }

    Ok(AnalysisResult {
        layout: layout.clone(),
        table: normalized,
        channels: results,
    })
}

pub fn run_multi_analysis(
    blocks: &[ExperimentBlock],
    layout: &PlateLayout,
    params: &AnalysisParams,
) -> Result<MultiAnalysisResult, PipelineError> {
    prepare_layout(layout, params)?;
    let mut experiments = Vec::with_capacity(blocks.len());
    for block in blocks {
        tracing::info!("analysing experiment {} ({})", block.meta.id, block.meta.name);
        let result = analyze(&block.table, layout, params)?;
        experiments.push(ExperimentResult {
            meta: block.meta.clone(),
            result,
        });
    }
    Ok(MultiAnalysisResult {
        layout: layout.clone(),
        experiments,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
