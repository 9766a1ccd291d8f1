use std::collections::BTreeMap;

use serde::Serialize;

use crate::input::multi::ExperimentMeta;
use crate::model::summary::MetricStats;
use crate::pipeline::stage1_layout::{LayoutIssue, PlateLayout};
use crate::pipeline::{AnalysisParams, AnalysisResult, ChannelResult, MultiAnalysisResult};

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMeta {
    pub path: String,
    pub sheet: String,
    pub mode: String,
}

#[derive(Debug, Serialize)]
struct LayoutJson<'a> {
    n_rows: usize,
    n_cols: usize,
    n_wells: usize,
    rectangular: bool,
    issues: &'a [LayoutIssue],
    conditions: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ParamsJson<'a> {
    positive_label: &'a str,
    cq_undetermined: f64,
    strict_layout: bool,
    metrics: &'a [String],
}

#[derive(Debug, Serialize)]
struct ConditionJson<'a> {
    loaded: &'a str,
    n_loaded: usize,
    n_positive: usize,
    detection_pct: f64,
    metrics: BTreeMap<&'a str, MetricStats>,
}

#[derive(Debug, Serialize)]
struct ChannelJson<'a> {
    channel: &'a str,
    n_rows: usize,
    n_cq_recoded: usize,
    conditions: Vec<ConditionJson<'a>>,
    conditions_without_data: &'a [String],
}

#[derive(Debug, Serialize)]
struct RunJson<'a> {
    n_rows: usize,
    n_rows_unlabelled: usize,
    channels: Vec<ChannelJson<'a>>,
}

#[derive(Debug, Serialize)]
struct SummaryJson<'a> {
    tool: &'a ToolMeta,
    input: &'a InputMeta,
    params: ParamsJson<'a>,
    layout: LayoutJson<'a>,
    #[serde(flatten)]
    run: RunJson<'a>,
}

#[derive(Debug, Serialize)]
struct ExperimentJson<'a> {
    #[serde(flatten)]
    meta: &'a ExperimentMeta,
    #[serde(flatten)]
    run: RunJson<'a>,
}

#[derive(Debug, Serialize)]
struct MultiSummaryJson<'a> {
    tool: &'a ToolMeta,
    input: &'a InputMeta,
    params: ParamsJson<'a>,
    layout: LayoutJson<'a>,
    experiments: Vec<ExperimentJson<'a>>,
}

fn layout_json(layout: &PlateLayout) -> LayoutJson<'_> {
    LayoutJson {
        n_rows: layout.n_rows(),
        n_cols: layout.n_cols,
        n_wells: layout.n_wells(),
        rectangular: layout.is_rectangular(),
        issues: &layout.issues,
        conditions: layout.conditions().into_iter().collect(),
    }
}

fn params_json<'a>(params: &'a AnalysisParams, metrics: &'a [String]) -> ParamsJson<'a> {
    ParamsJson {
        positive_label: &params.positive_label,
        cq_undetermined: params.cq_undetermined,
        strict_layout: params.strict_layout,
        metrics,
    }
}

fn channel_json(channel: &ChannelResult) -> ChannelJson<'_> {
    let metrics = &channel.summary.metrics.names;
    let conditions = channel
        .summary
        .conditions
        .iter()
        .map(|c| ConditionJson {
            loaded: &c.loaded,
            n_loaded: c.n_loaded,
            n_positive: c.n_positive,
            detection_pct: c.detection_pct,
            metrics: metrics
                .iter()
                .map(String::as_str)
                .zip(c.stats.iter().copied())
                .collect(),
        })
        .collect();
    ChannelJson {
        channel: channel.channel(),
        n_rows: channel.subset.records.len(),
        n_cq_recoded: channel.subset.n_cq_recoded,
        conditions,
        conditions_without_data: &channel.conditions_without_data,
    }
}

fn run_json(result: &AnalysisResult) -> RunJson<'_> {
    RunJson {
        n_rows: result.table.records.len(),
        n_rows_unlabelled: result.table.n_unmapped(),
        channels: result.channels.iter().map(channel_json).collect(),
    }
}

pub fn render_summary_json(
    result: &AnalysisResult,
    params: &AnalysisParams,
    tool: &ToolMeta,
    input: &InputMeta,
) -> serde_json::Result<String> {
    let summary = SummaryJson {
        tool,
        input,
        params: params_json(params, &result.table.metrics.names),
        layout: layout_json(&result.layout),
        run: run_json(result),
    };
    serde_json::to_string_pretty(&summary)
}

pub fn render_multi_summary_json(
    result: &MultiAnalysisResult,
    params: &AnalysisParams,
    tool: &ToolMeta,
    input: &InputMeta,
) -> serde_json::Result<String> {
    let metrics: &[String] = result
        .experiments
        .first()
        .map(|e| e.result.table.metrics.names.as_slice())
        .unwrap_or(&[]);
    let summary = MultiSummaryJson {
        tool,
        input,
        params: params_json(params, metrics),
        layout: layout_json(&result.layout),
        experiments: result
            .experiments
            .iter()
            .map(|e| ExperimentJson {
                meta: &e.meta,
                run: run_json(&e.result),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary)
}
