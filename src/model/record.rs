use crate::model::assay::CQ_METRIC;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Empty cells and whitespace-only text count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Best-effort numeric coercion; non-numeric and non-finite values are missing.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Empty => return None,
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(self.render())
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.clone(),
        }
    }
}

pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub row: usize,
    pub sample: Option<String>,
    pub well: Option<u32>,
    pub channel: Option<String>,
    pub assay: Option<String>,
    pub classification: Option<String>,
    /// Values aligned with the run's `MetricSet`.
    pub metrics: Vec<Option<f64>>,
    pub loaded: Option<String>,
    pub cells: Vec<Cell>,
}

impl MeasurementRecord {
    pub fn cq(&self) -> Option<f64> {
        self.metrics.get(CQ_METRIC).copied().flatten()
    }

    pub fn is_positive(&self, positive_label: &str) -> bool {
        self.classification.as_deref() == Some(positive_label)
    }
}
