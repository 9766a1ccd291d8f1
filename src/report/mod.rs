pub mod json;
pub mod plots;
pub mod text;
pub mod tsv;
pub mod workbook;

use std::cmp::Ordering;

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

/// Missing values render as empty cells.
pub fn format_opt(v: Option<f64>) -> String {
    v.map(format_f64_6).unwrap_or_default()
}

/// Linear-interpolated quantile over the sorted input; `None` when empty.
pub fn quantile_linear(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(BoxStats {
        min: *sorted.first()?,
        q1: quantile_linear(&sorted, 0.25)?,
        median: quantile_linear(&sorted, 0.5)?,
        q3: quantile_linear(&sorted, 0.75)?,
        max: *sorted.last()?,
    })
}

/// Keeps ASCII letters, digits, `-` and `_`; anything else becomes `_`.
pub fn file_safe_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// First run of digits in a label, e.g. the concentration in `100_FluA`.
pub fn leading_number(label: &str) -> Option<f64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Condition part of a `concentration_condition` label.
pub fn condition_part(label: &str) -> &str {
    match label.split_once('_') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => label,
    }
}

/// Highest concentration first, ties by label; labels without a number last.
pub fn plot_order<'a, I>(labels: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<&str> = labels.into_iter().collect();
    out.sort_by(|a, b| match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => y
            .partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
    out.dedup();
    out
}
