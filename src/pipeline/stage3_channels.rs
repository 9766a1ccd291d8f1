use std::collections::BTreeSet;

use crate::model::assay::{CQ_METRIC, ChannelSelection};
use crate::model::record::MeasurementRecord;
use crate::pipeline::stage2_normalize::NormalizedTable;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSubset {
    pub channel: String,
    pub records: Vec<MeasurementRecord>,
    pub n_cq_recoded: usize,
}

pub fn resolve_channels(table: &NormalizedTable, selection: &ChannelSelection) -> Vec<String> {
    match selection {
        ChannelSelection::Listed(channels) => channels.clone(),
        ChannelSelection::Discover => table
            .records
            .iter()
            .filter_map(|r| r.channel.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

pub fn split_channels(
    table: &NormalizedTable,
    channels: &[String],
    cq_sentinel: f64,
) -> Vec<ChannelSubset> {
    let mut subsets = Vec::with_capacity(channels.len());
    for channel in channels {
        let mut records: Vec<MeasurementRecord> = table
            .records
            .iter()
            .filter(|r| r.channel.as_deref() == Some(channel.as_str()))
            .cloned()
            .collect();
        let n_cq_recoded = recode_undetermined(&mut records, cq_sentinel);
        if records.is_empty() {
            tracing::warn!("channel {} has no rows", channel);
        } else {
            tracing::info!(
                "{}: {} rows, replaced {} Cq values of {} with missing",
                channel,
                records.len(),
                n_cq_recoded,
                cq_sentinel
            );
        }
        subsets.push(ChannelSubset {
            channel: channel.clone(),
            records,
            n_cq_recoded,
        });
    }
    subsets
}

/// Replaces sentinel Cq values with missing; classification is left as-is.
pub fn recode_undetermined(records: &mut [MeasurementRecord], cq_sentinel: f64) -> usize {
    let mut recoded = 0usize;
    for record in records.iter_mut() {
        if let Some(slot) = record.metrics.get_mut(CQ_METRIC) {
            if *slot == Some(cq_sentinel) {
                *slot = None;
                recoded += 1;
            }
        }
    }
    recoded
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_channels.rs"]
mod tests;
