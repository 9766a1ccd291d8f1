mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::input::layout::{LayoutSource, read_layout_text};
use crate::input::multi::split_experiments;
use crate::input::{SheetSelector, load_grid, load_table};
use crate::model::assay::{ChannelSelection, DEFAULT_CHANNELS, GREEN_ENDPOINT_COLUMN, POSITIVE_LABEL};
use crate::pipeline::stage1_layout::parse_layout;
use crate::pipeline::stage6_report::{ReportOptions, write_multi_reports, write_reports};
use crate::pipeline::{AnalysisParams, run_analysis, run_multi_analysis};
use crate::report::json::{InputMeta, ToolMeta};

const TOOL_NAME: &str = "kira-qpcrqc";

#[derive(Debug, Parser)]
#[command(name = "kira-qpcrqc")]
#[command(about = "qPCR plate analysis: layout mapping, replicate statistics and detection rates", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyse a single-experiment export
    Run(RunArgs),
    /// Analyse a workbook holding several experiment blocks (ID:/Name:/Device: headers)
    Multi(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Instrument export (.xlsx/.xls/.xlsm/.ods or .tsv/.txt/.csv, optionally .gz)
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Plate layout file, or "-" to paste it on stdin
    #[arg(long, value_name = "FILE")]
    layout: PathBuf,

    /// Output directory
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Worksheet index (0-based) or name
    #[arg(long, value_name = "SHEET", default_value = "0")]
    sheet: SheetSelector,

    /// Channels to analyse
    #[arg(long, value_name = "CH[,CH]", value_delimiter = ',', default_values_t = DEFAULT_CHANNELS.map(String::from))]
    channels: Vec<String>,

    /// Analyse every channel present in the data instead of --channels
    #[arg(long)]
    discover_channels: bool,

    /// Classification value counted as a detection (case-sensitive)
    #[arg(long, value_name = "LABEL", default_value = POSITIVE_LABEL)]
    positive_label: String,

    /// Additional numeric metric column; repeatable
    #[arg(long = "extra-metric", value_name = "COLUMN", default_values_t = [GREEN_ENDPOINT_COLUMN.to_string()])]
    extra_metrics: Vec<String>,

    /// Fail on a ragged layout instead of warning
    #[arg(long)]
    strict_layout: bool,

    /// Skip SVG plots
    #[arg(long)]
    no_plots: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Single,
    Multi,
}

impl RunMode {
    fn as_str(self) -> &'static str {
        match self {
            RunMode::Single => "single",
            RunMode::Multi => "multi",
        }
    }
}

#[derive(Debug, Clone)]
struct RunConfig {
    mode: RunMode,
    input: PathBuf,
    layout: LayoutSource,
    out_dir: PathBuf,
    sheet: SheetSelector,
    plots: bool,
    verbose: bool,
    params: AnalysisParams,
}

impl RunConfig {
    fn from_cli(cli: Cli) -> Result<Self, String> {
        let (mode, args) = match cli.command {
            Command::Run(args) => (RunMode::Single, args),
            Command::Multi(args) => (RunMode::Multi, args),
        };

        let channels = if args.discover_channels {
            ChannelSelection::Discover
        } else {
            let listed: Vec<String> = args
                .channels
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if listed.is_empty() {
                return Err("--channels must name at least one channel".to_string());
            }
            ChannelSelection::Listed(listed)
        };

        let positive_label = args.positive_label.trim().to_string();
        if positive_label.is_empty() {
            return Err("--positive-label must not be empty".to_string());
        }

        let mut params = AnalysisParams::default_v1();
        params.positive_label = positive_label;
        params.channels = channels;
        params.extra_metrics = args
            .extra_metrics
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        params.strict_layout = args.strict_layout;

        Ok(RunConfig {
            mode,
            layout: LayoutSource::from_arg(&args.layout),
            input: args.input,
            out_dir: args.out,
            sheet: args.sheet,
            plots: !args.no_plots,
            verbose: args.verbose,
            params,
        })
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = RunConfig::from_cli(cli)?;
    logging::init(config.verbose);
    execute(&config)
}

fn execute(config: &RunConfig) -> Result<(), String> {
    tracing::info!(
        "{} {} ({} mode): {}",
        TOOL_NAME,
        env!("CARGO_PKG_VERSION"),
        config.mode.as_str(),
        config.input.display()
    );

    let layout_text = read_layout_text(&config.layout).map_err(|e| e.to_string())?;
    let layout = parse_layout(&layout_text);

    let options = ReportOptions {
        plots: config.plots,
        tool: ToolMeta {
            name: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputMeta {
            path: config.input.display().to_string(),
            sheet: config.sheet.to_string(),
            mode: config.mode.as_str().to_string(),
        },
    };

    match config.mode {
        RunMode::Single => {
            let table = load_table(&config.input, &config.sheet).map_err(|e| e.to_string())?;
            let result = run_analysis(&table, &layout, &config.params).map_err(|e| e.to_string())?;
            write_reports(&result, &config.params, &config.out_dir, &options)
                .map_err(|e| e.to_string())?;
        }
        RunMode::Multi => {
            let grid = load_grid(&config.input, &config.sheet).map_err(|e| e.to_string())?;
            let blocks = split_experiments(&grid).map_err(|e| e.to_string())?;
            tracing::info!("found {} experiment blocks", blocks.len());
            let result =
                run_multi_analysis(&blocks, &layout, &config.params).map_err(|e| e.to_string())?;
            write_multi_reports(&result, &config.params, &config.out_dir, &options)
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
