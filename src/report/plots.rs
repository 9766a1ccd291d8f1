use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::model::summary::FlatRow;
use crate::pipeline::ChannelResult;
use crate::report::{box_stats, condition_part, file_safe_name, plot_order};

const BOX_HALF_WIDTH: f64 = 0.3;
const BAR_HALF_WIDTH: f64 = 0.35;

/// Values of one metric for one label, in plot order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub label: &'a str,
    pub values: Vec<f64>,
}

fn palette_for(labels: &[&str]) -> Vec<RGBAColor> {
    let mut conditions: Vec<&str> = Vec::new();
    labels
        .iter()
        .map(|label| {
            let cond = condition_part(label);
            let idx = match conditions.iter().position(|c| *c == cond) {
                Some(idx) => idx,
                None => {
                    conditions.push(cond);
                    conditions.len() - 1
                }
            };
            Palette99::pick(idx).to_rgba()
        })
        .collect()
}

fn label_formatter<'a>(labels: &'a [&'a str]) -> impl Fn(&f64) -> String + 'a {
    move |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels
            .get(idx as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

pub fn render_box_plot(
    out_path: &Path,
    title: &str,
    metric: &str,
    groups: &[Group<'_>],
) -> Result<(), Box<dyn Error>> {
    let labels: Vec<&str> = groups.iter().map(|g| g.label).collect();
    let colors = palette_for(&labels);
    let n = groups.len().max(1);

    let all = groups.iter().flat_map(|g| g.values.iter().copied());
    let (mut y_min, mut y_max) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if (y_max - y_min).abs() < 1e-9 {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = 0.1 * (y_max - y_min);

    let root = SVGBackend::new(out_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (y_min - pad)..(y_max + pad))?;

    let formatter = label_formatter(&labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&formatter)
        .x_desc("Loaded")
        .y_desc(metric)
        .draw()?;

    for (i, group) in groups.iter().enumerate() {
        let x = i as f64;
        let color = colors[i];
        if let Some(stats) = box_stats(&group.values) {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - BOX_HALF_WIDTH, stats.q1), (x + BOX_HALF_WIDTH, stats.q3)],
                color.mix(0.3).filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - BOX_HALF_WIDTH, stats.q1), (x + BOX_HALF_WIDTH, stats.q3)],
                color.stroke_width(1),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x - BOX_HALF_WIDTH, stats.median), (x + BOX_HALF_WIDTH, stats.median)],
                BLACK.stroke_width(2),
            )))?;
            for (from, to) in [(stats.min, stats.q1), (stats.q3, stats.max)] {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(x, from), (x, to)],
                    color.stroke_width(1),
                )))?;
            }
            for cap in [stats.min, stats.max] {
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(x - 0.1, cap), (x + 0.1, cap)],
                    color.stroke_width(1),
                )))?;
            }
        }
        chart.draw_series(group.values.iter().enumerate().map(|(j, &v)| {
            let jitter = ((j % 5) as f64 - 2.0) * 0.04;
            Circle::new((x + jitter, v), 3, color.filled())
        }))?;
    }

    root.present()?;
    Ok(())
}

pub fn render_detection_plot(
    out_path: &Path,
    title: &str,
    rows: &[&FlatRow],
) -> Result<(), Box<dyn Error>> {
    let labels: Vec<&str> = rows.iter().map(|r| r.loaded.as_str()).collect();
    let colors = palette_for(&labels);
    let n = rows.len().max(1);

    let root = SVGBackend::new(out_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0.0f64..110.0f64)?;

    let formatter = label_formatter(&labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&formatter)
        .x_desc("Loaded")
        .y_desc("Detection %")
        .draw()?;

    let centered = ("sans-serif", 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (i, row) in rows.iter().enumerate() {
        let x = i as f64;
        let pct = row.detection_pct;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, pct)],
            colors[i].filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.1}%", pct),
            (x, (pct / 2.0).max(3.0)),
            centered.clone(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("n={}", row.n_loaded),
            (x, pct + 4.0),
            centered.clone(),
        )))?;
    }

    root.present()?;
    Ok(())
}

pub fn plot_file_stem(channel: &str, metric: &str) -> String {
    let metric: String = metric
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!(
        "{}_{}_box",
        file_safe_name(channel, "channel"),
        metric.trim_end_matches('_')
    )
}

pub fn detection_file_name(channel: &str) -> String {
    format!("{}_detection.svg", file_safe_name(channel, "channel"))
}

/// Box plots per metric plus the detection bar chart for one channel.
pub fn write_channel_plots(
    plot_dir: &Path,
    channel: &ChannelResult,
    title_suffix: &str,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let name = channel.channel();
    let order = plot_order(channel.summary.conditions.iter().map(|c| c.loaded.as_str()));
    let mut written = Vec::new();

    for (m, metric) in channel.summary.metrics.names.iter().enumerate() {
        let groups: Vec<Group<'_>> = order
            .iter()
            .map(|&label| Group {
                label,
                values: channel
                    .subset
                    .records
                    .iter()
                    .filter(|r| r.loaded.as_deref() == Some(label))
                    .filter_map(|r| r.metrics.get(m).copied().flatten())
                    .collect(),
            })
            .collect();
        let path = plot_dir.join(format!("{}.svg", plot_file_stem(name, metric)));
        let title = format!("{} by Loaded ({}){}", metric, name, title_suffix);
        render_box_plot(&path, &title, metric, &groups)?;
        written.push(path);
    }

    let rows: Vec<&FlatRow> = order
        .iter()
        .filter_map(|&label| channel.flat.rows.iter().find(|r| r.loaded == label))
        .collect();
    let path = plot_dir.join(detection_file_name(name));
    let title = format!("Detection rate ({}){}", name, title_suffix);
    render_detection_plot(&path, &title, &rows)?;
    written.push(path);

    Ok(written)
}
