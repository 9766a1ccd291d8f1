use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

/// A row whose cell count differs from the first row's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutIssue {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl std::fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "layout row {} has {} cells, expected {}",
            self.row, self.found, self.expected
        )
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is empty")]
    Empty,
    #[error("malformed layout: {}", format_issues(.0))]
    Ragged(Vec<LayoutIssue>),
}

fn format_issues(issues: &[LayoutIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateLayout {
    pub grid: Vec<Vec<String>>,
    pub n_cols: usize,
    /// 1-based well number in row-major order -> label.
    pub mapping: BTreeMap<u32, String>,
    pub issues: Vec<LayoutIssue>,
}

impl PlateLayout {
    pub fn n_rows(&self) -> usize {
        self.grid.len()
    }

    pub fn n_wells(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_rectangular(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn label_for(&self, well: u32) -> Option<&str> {
        self.mapping.get(&well).map(String::as_str)
    }

    /// Distinct labels, sorted.
    pub fn conditions(&self) -> BTreeSet<&str> {
        self.mapping.values().map(String::as_str).collect()
    }
}

pub fn parse_layout(text: &str) -> PlateLayout {
    let trimmed = text.trim();
    let grid: Vec<Vec<String>> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed
            .lines()
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect()
    };

    let n_cols = grid.first().map(Vec::len).unwrap_or(0);
    let mut mapping = BTreeMap::new();
    let mut issues = Vec::new();

    for (r, row) in grid.iter().enumerate() {
        if row.len() != n_cols {
            issues.push(LayoutIssue {
                row: r + 1,
                expected: n_cols,
                found: row.len(),
            });
        }
        for c in 0..n_cols {
            let Some(label) = row.get(c) else {
                break;
            };
            let well = (r * n_cols + c + 1) as u32;
            mapping.insert(well, label.clone());
        }
    }

    PlateLayout {
        grid,
        n_cols,
        mapping,
        issues,
    }
}

/// Strict check: a non-empty, rectangular grid.
pub fn validate_layout(layout: &PlateLayout) -> Result<(), LayoutError> {
    if layout.grid.is_empty() {
        return Err(LayoutError::Empty);
    }
    if !layout.issues.is_empty() {
        return Err(LayoutError::Ragged(layout.issues.clone()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_layout.rs"]
mod tests;
