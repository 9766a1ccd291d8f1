use serde::Serialize;

/// Cq reported by the instrument when no amplification was detected.
pub const CQ_UNDETERMINED: f64 = -1.0;

pub const POSITIVE_LABEL: &str = "POSITIVE";

pub const DEFAULT_CHANNELS: [&str; 2] = ["CH2", "CH3"];

/// End-point fluorescence column some exports carry; summarized when it holds numbers.
pub const GREEN_ENDPOINT_COLUMN: &str = "Block02_Phase06_Cycle00_GREEN";

pub const CORE_METRICS: [&str; 3] = ["Cq", "Ampl.", "Slope"];
pub const CQ_METRIC: usize = 0;

pub mod columns {
    pub const SAMPLE_NAME: &str = "Sample_Name";
    pub const WELL_ID: &str = "Well_ID";
    pub const CHANNEL: &str = "Channel";
    pub const ASSAY: &str = "Assay";
    pub const CLASSIFICATION: &str = "Classification";
    pub const LOADED: &str = "Loaded";
    pub const EXPERIMENT_ID: &str = "Experiment_ID";
    pub const EXPERIMENT_NAME: &str = "Experiment_Name";
    pub const DEVICE: &str = "Device";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelection {
    Listed(Vec<String>),
    Discover,
}

impl ChannelSelection {
    pub fn default_v1() -> Self {
        ChannelSelection::Listed(DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect())
    }
}

/// Ordered metric names; index `CQ_METRIC` is always Cq.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricSet {
    pub names: Vec<String>,
}

impl MetricSet {
    pub fn core() -> Self {
        Self {
            names: CORE_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_extras<I, S>(extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::core();
        for name in extras {
            let name = name.into();
            if !set.names.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
