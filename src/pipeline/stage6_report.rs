use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::RawTable;
use crate::input::multi::concat_tables;
use crate::pipeline::{AnalysisParams, AnalysisResult, MultiAnalysisResult};
use crate::report::json::{InputMeta, ToolMeta, render_multi_summary_json, render_summary_json};
use crate::report::plots::write_channel_plots;
use crate::report::file_safe_name;
use crate::report::text::{render_multi_report_text, render_report_text};
use crate::report::tsv::{
    full_data_table, write_flat_tsv, write_multi_summary_tsv, write_table_tsv,
};
use crate::report::workbook::{flat_table_cells, multi_summary_cells, write_workbook};

pub const FULL_DATA_FILE: &str = "Full_Data.tsv";
pub const MULTI_SUMMARY_FILE: &str = "Summary.tsv";
pub const SUMMARY_JSON_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.txt";
pub const PLOT_DIR: &str = "plots";
pub const RESULTS_WORKBOOK: &str = "results.xlsx";
pub const FULL_DATA_SHEET: &str = "Full_Data";
pub const SUMMARY_SHEET: &str = "Summary";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plot error: {0}")]
    Plot(String),
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub plots: bool,
    pub tool: ToolMeta,
    pub input: InputMeta,
}

pub fn channel_summary_file(channel: &str) -> String {
    format!("{}_summary.tsv", file_safe_name(channel, "channel"))
}

pub fn write_reports(
    result: &AnalysisResult,
    params: &AnalysisParams,
    out_dir: &Path,
    options: &ReportOptions,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    for channel in &result.channels {
        let path = out_dir.join(channel_summary_file(channel.channel()));
        write_flat_tsv(&path, &channel.flat)?;
        written.push(path);
    }

    let full_table = full_data_table(&result.table);
    let full_path = out_dir.join(FULL_DATA_FILE);
    write_table_tsv(&full_path, &full_table)?;
    written.push(full_path);

    let channel_tables: Vec<_> = result
        .channels
        .iter()
        .map(|c| (c.channel(), flat_table_cells(&c.flat)))
        .collect();
    let mut sheets: Vec<(&str, &RawTable)> =
        channel_tables.iter().map(|(name, table)| (*name, table)).collect();
    sheets.push((FULL_DATA_SHEET, &full_table));
    let workbook_path = out_dir.join(RESULTS_WORKBOOK);
    write_workbook(&workbook_path, &sheets)?;
    written.push(workbook_path);

    let json = render_summary_json(result, params, &options.tool, &options.input)?;
    written.push(write_text(&out_dir.join(SUMMARY_JSON_FILE), &json)?);

    let report = render_report_text(result);
    written.push(write_text(&out_dir.join(REPORT_FILE), &report)?);

    if options.plots {
        let plot_dir = out_dir.join(PLOT_DIR);
        fs::create_dir_all(&plot_dir)?;
        for channel in &result.channels {
            let paths = write_channel_plots(&plot_dir, channel, "")
                .map_err(|e| ReportError::Plot(e.to_string()))?;
            written.extend(paths);
        }
    }

    tracing::info!("wrote {} files to {}", written.len(), out_dir.display());
    Ok(written)
}

pub fn write_multi_reports(
    result: &MultiAnalysisResult,
    params: &AnalysisParams,
    out_dir: &Path,
    options: &ReportOptions,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let summary_rows: Vec<_> = result
        .experiments
        .iter()
        .flat_map(|e| e.result.channels.iter().map(move |c| (&e.meta, &c.flat)))
        .collect();
    let summary_path = out_dir.join(MULTI_SUMMARY_FILE);
    write_multi_summary_tsv(&summary_path, &summary_rows)?;
    written.push(summary_path);

    let full_tables: Vec<_> = result
        .experiments
        .iter()
        .map(|e| full_data_table(&e.result.table))
        .collect();
    let full_table = concat_tables(&full_tables);
    let full_path = out_dir.join(FULL_DATA_FILE);
    write_table_tsv(&full_path, &full_table)?;
    written.push(full_path);

    let summary_table = multi_summary_cells(&summary_rows);
    let workbook_path = out_dir.join(RESULTS_WORKBOOK);
    write_workbook(
        &workbook_path,
        &[(SUMMARY_SHEET, &summary_table), (FULL_DATA_SHEET, &full_table)],
    )?;
    written.push(workbook_path);

    let json = render_multi_summary_json(result, params, &options.tool, &options.input)?;
    written.push(write_text(&out_dir.join(SUMMARY_JSON_FILE), &json)?);

    let report = render_multi_report_text(result);
    written.push(write_text(&out_dir.join(REPORT_FILE), &report)?);

    if options.plots {
        for exp in &result.experiments {
            let plot_dir = out_dir.join(PLOT_DIR).join(file_safe_name(&exp.meta.id, "experiment"));
            fs::create_dir_all(&plot_dir)?;
            let suffix = format!(" - experiment {}", exp.meta.id);
            for channel in &exp.result.channels {
                let paths = write_channel_plots(&plot_dir, channel, &suffix)
                    .map_err(|e| ReportError::Plot(e.to_string()))?;
                written.extend(paths);
            }
        }
    }

    tracing::info!("wrote {} files to {}", written.len(), out_dir.display());
    Ok(written)
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<PathBuf> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
