use crate::pipeline::{AnalysisResult, ChannelResult, MultiAnalysisResult};
use crate::report::{format_opt, format_f64_6};

pub fn render_report_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("qPCR Plate Analysis Report\n");
    out.push_str("==========================\n\n");
    push_run(&mut out, result);
    out
}

pub fn render_multi_report_text(result: &MultiAnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("qPCR Multi-Experiment Report\n");
    out.push_str("============================\n\n");
    for exp in &result.experiments {
        out.push_str(&format!(
            "Experiment {} ({}) on {}\n",
            exp.meta.id,
            if exp.meta.name.is_empty() { "unnamed" } else { exp.meta.name.as_str() },
            if exp.meta.device.is_empty() { "unknown device" } else { exp.meta.device.as_str() }
        ));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        push_run(&mut out, &exp.result);
    }
    out
}

fn push_run(out: &mut String, result: &AnalysisResult) {
    let layout = &result.layout;
    out.push_str(&format!(
        "Layout: {} rows x {} columns, {} wells mapped\n",
        layout.n_rows(),
        layout.n_cols,
        layout.n_wells()
    ));
    for issue in &layout.issues {
        out.push_str(&format!("  WARNING: {}\n", issue));
    }
    out.push_str(&format!(
        "Rows: {} total, {} without a layout label\n\n",
        result.table.records.len(),
        result.table.n_unmapped()
    ));

    for channel in &result.channels {
        push_channel(out, channel);
    }
}

fn push_channel(out: &mut String, channel: &ChannelResult) {
    out.push_str(&format!("{} summary\n", channel.channel()));
    out.push_str(&format!(
        "Rows: {}; Cq values of -1 replaced with missing: {}\n",
        channel.subset.records.len(),
        channel.subset.n_cq_recoded
    ));

    if channel.summary.conditions.is_empty() {
        out.push_str("No labelled rows.\n\n");
        return;
    }

    let mut header = vec!["Loaded".to_string()];
    for name in &channel.summary.metrics.names {
        header.push(format!("{name} mean"));
        header.push(format!("{name} std"));
    }
    header.push("n".to_string());
    header.push("Detection %".to_string());
    out.push_str(&header.join("\t"));
    out.push('\n');

    for c in &channel.summary.conditions {
        let mut fields = vec![c.loaded.clone()];
        for s in &c.stats {
            fields.push(or_dash(format_opt(s.mean)));
            fields.push(or_dash(format_opt(s.std)));
        }
        fields.push(c.n_loaded.to_string());
        fields.push(format_f64_6(c.detection_pct));
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }

    if !channel.conditions_without_data.is_empty() {
        out.push_str(&format!(
            "Layout conditions without data: {}\n",
            channel.conditions_without_data.join(", ")
        ));
    }
    out.push('\n');
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}
