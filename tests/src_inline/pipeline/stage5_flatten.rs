use std::collections::BTreeMap;

use super::*;
use crate::model::summary::{ConditionSummary, MetricStats};

fn summary() -> ChannelSummary {
    ChannelSummary {
        channel: "CH3".to_string(),
        metrics: MetricSet::core(),
        conditions: vec![
            ConditionSummary {
                loaded: "A".to_string(),
                stats: vec![
                    MetricStats { mean: Some(21.0), std: Some(1.0) },
                    MetricStats { mean: Some(500.0), std: None },
                    MetricStats { mean: None, std: None },
                ],
                n_loaded: 4,
                n_positive: 3,
                detection_pct: 75.0,
            },
            ConditionSummary {
                loaded: "B".to_string(),
                stats: vec![MetricStats { mean: Some(30.0), std: Some(2.0) }; 3],
                n_loaded: 2,
                n_positive: 0,
                detection_pct: 0.0,
            },
        ],
    }
}

#[test]
fn test_flat_column_names() {
    let cols = flat_columns(&MetricSet::core());
    assert_eq!(
        cols,
        vec![
            "Loaded",
            "Cq_mean",
            "Cq_std",
            "Ampl._mean",
            "Ampl._std",
            "Slope_mean",
            "Slope_std",
            "QC_N_loaded",
            "Detection_%",
            "Channel",
        ]
    );
}

#[test]
fn test_flatten_rows_carry_channel_and_values() {
    let flat = flatten_summary(&summary());
    assert_eq!(flat.rows.len(), 2);
    let a = &flat.rows[0];
    assert_eq!(a.loaded, "A");
    assert_eq!(a.channel, "CH3");
    assert_eq!(
        a.values,
        vec![Some(21.0), Some(1.0), Some(500.0), None, None, None]
    );
    assert_eq!(flat.column_index("Cq_std"), Some(2));
    assert_eq!(flat.column_index("Detection_%"), Some(8));
}

#[test]
fn test_flatten_then_regroup_matches_summary() {
    let s = summary();
    let flat = flatten_summary(&s);

    let mut regrouped: BTreeMap<(String, String), (usize, f64)> = BTreeMap::new();
    for row in &flat.rows {
        regrouped.insert(
            (row.loaded.clone(), row.channel.clone()),
            (row.n_loaded, row.detection_pct),
        );
    }

    assert_eq!(regrouped.len(), s.conditions.len());
    for c in &s.conditions {
        let key = (c.loaded.clone(), s.channel.clone());
        assert_eq!(regrouped[&key], (c.n_loaded, c.detection_pct));
    }
}

#[test]
fn test_flatten_extra_metric_columns() {
    let metrics = MetricSet::with_extras(["GREEN"]);
    let cols = flat_columns(&metrics);
    assert_eq!(cols.len(), 2 * 4 + 4);
    assert_eq!(cols[7], "GREEN_mean");
    assert_eq!(cols[8], "GREEN_std");
}
