use super::*;
use crate::model::assay::{CQ_UNDETERMINED, MetricSet};

fn record(row: usize, well: u32, channel: &str, cq: f64, class: &str) -> MeasurementRecord {
    MeasurementRecord {
        row,
        sample: Some(format!("S{well}")),
        well: Some(well),
        channel: Some(channel.to_string()),
        assay: None,
        classification: Some(class.to_string()),
        metrics: vec![Some(cq), Some(100.0), Some(0.5)],
        loaded: Some("A".to_string()),
        cells: Vec::new(),
    }
}

fn table() -> NormalizedTable {
    NormalizedTable {
        columns: Vec::new(),
        metrics: MetricSet::core(),
        records: vec![
            record(0, 1, "CH2", 20.0, "POSITIVE"),
            record(1, 1, "CH3", -1.0, "POSITIVE"),
            record(2, 2, "CH2", -1.0, "NEGATIVE"),
            record(3, 2, "CH3", 30.0, "POSITIVE"),
            record(4, 3, "CH5", 28.0, "POSITIVE"),
        ],
    }
}

#[test]
fn test_split_by_listed_channels() {
    let channels = vec!["CH2".to_string(), "CH3".to_string()];
    let subsets = split_channels(&table(), &channels, CQ_UNDETERMINED);
    assert_eq!(subsets.len(), 2);
    assert_eq!(subsets[0].channel, "CH2");
    let rows: Vec<usize> = subsets[0].records.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![0, 2]);
    let rows: Vec<usize> = subsets[1].records.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![1, 3]);
}

#[test]
fn test_sentinel_recoded_per_channel() {
    let channels = vec!["CH2".to_string(), "CH3".to_string()];
    let subsets = split_channels(&table(), &channels, CQ_UNDETERMINED);
    assert_eq!(subsets[0].n_cq_recoded, 1);
    assert_eq!(subsets[0].records[1].cq(), None);
    assert_eq!(subsets[0].records[0].cq(), Some(20.0));
    assert_eq!(subsets[1].n_cq_recoded, 1);
}

#[test]
fn test_recoding_keeps_classification_and_other_metrics() {
    let channels = vec!["CH3".to_string()];
    let subsets = split_channels(&table(), &channels, CQ_UNDETERMINED);
    let rec = &subsets[0].records[0];
    assert_eq!(rec.cq(), None);
    assert_eq!(rec.classification.as_deref(), Some("POSITIVE"));
    assert_eq!(rec.metrics[1], Some(100.0));
}

#[test]
fn test_source_table_untouched() {
    let source = table();
    let _ = split_channels(&source, &["CH2".to_string()], CQ_UNDETERMINED);
    assert_eq!(source.records[2].cq(), Some(-1.0));
}

#[test]
fn test_listed_channel_without_rows_is_empty() {
    let subsets = split_channels(&table(), &["CH9".to_string()], CQ_UNDETERMINED);
    assert_eq!(subsets.len(), 1);
    assert!(subsets[0].records.is_empty());
    assert_eq!(subsets[0].n_cq_recoded, 0);
}

#[test]
fn test_discover_channels_sorted() {
    let channels = resolve_channels(&table(), &ChannelSelection::Discover);
    assert_eq!(channels, vec!["CH2", "CH3", "CH5"]);
    let listed = resolve_channels(&table(), &ChannelSelection::default_v1());
    assert_eq!(listed, vec!["CH2", "CH3"]);
}
