use std::collections::BTreeMap;

use crate::model::assay::MetricSet;
use crate::model::record::MeasurementRecord;
use crate::model::summary::{ChannelSummary, ConditionSummary, MetricStats};
use crate::pipeline::stage1_layout::PlateLayout;
use crate::pipeline::stage3_channels::ChannelSubset;

pub fn aggregate_channel(
    subset: &ChannelSubset,
    metrics: &MetricSet,
    positive_label: &str,
) -> ChannelSummary {
    let mut groups: BTreeMap<&str, Vec<&MeasurementRecord>> = BTreeMap::new();
    for record in &subset.records {
        if let Some(label) = record.loaded.as_deref() {
            groups.entry(label).or_default().push(record);
        }
    }

    let conditions = groups
        .into_iter()
        .map(|(label, rows)| summarize_condition(label, &rows, metrics, positive_label))
        .collect();

    ChannelSummary {
        channel: subset.channel.clone(),
        metrics: metrics.clone(),
        conditions,
    }
}

fn summarize_condition(
    label: &str,
    rows: &[&MeasurementRecord],
    metrics: &MetricSet,
    positive_label: &str,
) -> ConditionSummary {
    let stats = (0..metrics.len())
        .map(|m| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.metrics.get(m).copied().flatten())
                .collect();
            metric_stats(&values)
        })
        .collect();

    let n_loaded = rows.len();
    let n_positive = rows.iter().filter(|r| r.is_positive(positive_label)).count();

    ConditionSummary {
        loaded: label.to_string(),
        stats,
        n_loaded,
        n_positive,
        detection_pct: detection_percentage(n_positive, n_loaded),
    }
}

pub fn metric_stats(values: &[f64]) -> MetricStats {
    MetricStats {
        mean: mean(values),
        std: sample_std(values),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with the n-1 denominator; undefined below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn detection_percentage(n_positive: usize, n_total: usize) -> f64 {
    if n_total == 0 {
        return 0.0;
    }
    100.0 * n_positive as f64 / n_total as f64
}

/// Layout labels that never appear in the summary.
pub fn conditions_without_data(summary: &ChannelSummary, layout: &PlateLayout) -> Vec<String> {
    layout
        .conditions()
        .into_iter()
        .filter(|label| !summary.conditions.iter().any(|c| c.loaded == *label))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_aggregate.rs"]
mod tests;
