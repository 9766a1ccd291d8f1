use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_qpcrqc_main_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn parse(args: &[&str]) -> Result<RunConfig, String> {
    let cli = Cli::try_parse_from(std::iter::once("kira-qpcrqc").chain(args.iter().copied()))
        .map_err(|e| e.to_string())?;
    RunConfig::from_cli(cli)
}

const BASE: [&str; 7] = ["run", "--input", "plate.xlsx", "--layout", "layout.txt", "--out", "out"];

#[test]
fn test_parse_args_defaults() {
    let config = parse(&BASE).unwrap();
    assert_eq!(config.mode, RunMode::Single);
    assert_eq!(config.sheet, SheetSelector::Index(0));
    assert_eq!(config.layout, LayoutSource::File(PathBuf::from("layout.txt")));
    assert!(config.plots);
    assert_eq!(config.params, AnalysisParams::default_v1());
}

#[test]
fn test_parse_args_multi_with_options() {
    let args = [
        "multi",
        "--input",
        "runs.xlsx",
        "--layout",
        "-",
        "--out",
        "out",
        "--sheet",
        "Results",
        "--channels",
        "CH1, CH4",
        "--positive-label",
        "DETECTED",
        "--extra-metric",
        "Tm",
        "--strict-layout",
        "--no-plots",
    ];
    let config = parse(&args).unwrap();
    assert_eq!(config.mode, RunMode::Multi);
    assert_eq!(config.layout, LayoutSource::Stdin);
    assert_eq!(config.sheet, SheetSelector::Name("Results".to_string()));
    assert_eq!(
        config.params.channels,
        ChannelSelection::Listed(vec!["CH1".to_string(), "CH4".to_string()])
    );
    assert_eq!(config.params.positive_label, "DETECTED");
    assert_eq!(config.params.extra_metrics, vec!["Tm".to_string()]);
    assert!(config.params.strict_layout);
    assert!(!config.plots);
}

#[test]
fn test_parse_args_discover_channels() {
    let mut args = BASE.to_vec();
    args.push("--discover-channels");
    let config = parse(&args).unwrap();
    assert_eq!(config.params.channels, ChannelSelection::Discover);
}

#[test]
fn test_parse_args_empty_extra_metric_disables_extras() {
    let mut args = BASE.to_vec();
    args.extend(["--extra-metric", ""]);
    let config = parse(&args).unwrap();
    assert!(config.params.extra_metrics.is_empty());
}

#[test]
fn test_parse_args_rejects_blank_positive_label() {
    let mut args = BASE.to_vec();
    args.extend(["--positive-label", "  "]);
    assert!(parse(&args).is_err());
}

#[test]
fn test_parse_args_missing_layout() {
    assert!(parse(&["run", "--input", "plate.xlsx", "--out", "out"]).is_err());
}

#[test]
fn test_execute_single_run_from_tsv() {
    let dir = make_temp_dir();
    let input = dir.join("plate.tsv");
    fs::write(
        &input,
        "Sample Name\tWell ID\tChannel\tCq\tAmpl.\tSlope\tClassification\n\
         S1\t1\tCH2\t20\t1000\t0.5\tPOSITIVE\n\
         \t\tCH2\t22\t1100\t0.5\tPOSITIVE\n\
         S2\t2\tCH2\t-1\t10\t0.1\tNEGATIVE\n",
    )
    .unwrap();
    let layout = dir.join("layout.txt");
    fs::write(&layout, "Mock\tInfected\n").unwrap();
    let out = dir.join("out");

    let config = parse(&[
        "run",
        "--input",
        input.to_str().unwrap(),
        "--layout",
        layout.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--no-plots",
    ])
    .unwrap();
    execute(&config).unwrap();

    let summary = fs::read_to_string(out.join("CH2_summary.tsv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Infected\t\t\t"));
    assert!(lines[2].starts_with("Mock\t21.000000\t1.414214\t"));
    assert!(out.join("summary.json").exists());
}

#[test]
fn test_execute_reports_missing_input() {
    let dir = make_temp_dir();
    let layout = dir.join("layout.txt");
    fs::write(&layout, "A\n").unwrap();
    let config = parse(&[
        "run",
        "--input",
        dir.join("absent.tsv").to_str().unwrap(),
        "--layout",
        layout.to_str().unwrap(),
        "--out",
        dir.join("out").to_str().unwrap(),
    ])
    .unwrap();
    assert!(execute(&config).is_err());
}

#[test]
fn test_execute_logs_table_shape_once() {
    let dir = make_temp_dir();
    let input = dir.join("plate.tsv");
    fs::write(
        &input,
        "Sample Name\tWell ID\tChannel\tCq\tAmpl.\tSlope\tClassification\n\
         S1\t1\tCH2\t20\t1000\t0.5\tPOSITIVE\n",
    )
    .unwrap();
    let layout = dir.join("layout.txt");
    fs::write(&layout, "A\n").unwrap();
    let config = parse(&[
        "run",
        "--input",
        input.to_str().unwrap(),
        "--layout",
        layout.to_str().unwrap(),
        "--out",
        dir.join("out").to_str().unwrap(),
        "--no-plots",
    ])
    .unwrap();

    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || execute(&config).unwrap());

    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert_eq!(logs.matches("loaded 1 rows x 7 columns").count(), 1);
}
