use mtrprom_model::{HopRecord, PathHealthSummary, PathReport};

use crate::sanitize::sanitize_label_value;

/// Serialize a report and its health summary as exposition text, one
/// `name{labels} value` fact per line, no comments, no blank lines, no
/// trailing newline (the writer owns the terminator). Output is
/// byte-stable for identical input.
pub fn render_report(report: &PathReport, summary: Option<&PathHealthSummary>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let base_labels = label_string(report, &[]);

    let responding: Vec<&HopRecord> = report
        .hops
        .iter()
        .filter(|hop| hop.is_responding())
        .collect();
    let silent_count = report.hops.len() - responding.len();

    lines.push(format!(
        "mtr_info{{{base_labels},port=\"{}\",protocol=\"{}\"}} 1",
        report.port, report.protocol
    ));

    if let Some(summary) = summary {
        lines.push(format!(
            "mtr_path_health_score{{{base_labels}}} {:.1}",
            summary.health_score
        ));
        lines.push(format!(
            "mtr_path_rtt_variance_ms{{{base_labels}}} {:.2}",
            summary.rtt_variance_ms
        ));
        lines.push(format!(
            "mtr_path_avg_jitter_ms{{{base_labels}}} {:.2}",
            summary.avg_jitter_ms
        ));
        lines.push(format!(
            "mtr_path_max_jitter_ms{{{base_labels}}} {:.2}",
            summary.max_jitter_ms
        ));
        lines.push(format!(
            "mtr_path_end_to_end_loss_percent{{{base_labels}}} {:.1}",
            summary.end_to_end_loss_percent
        ));
    }

    // Per-hop series only cover hops that answered; zero-valued latency
    // lines for silent hops would read as "instant" rather than "unknown".
    for hop in &responding {
        lines.push(format!(
            "mtr_loss_percent{{{}}} {:.1}",
            hop_labels(report, hop),
            hop.loss_percent
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_packets_sent{{{}}} {}",
            hop_labels(report, hop),
            hop.sent
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_last_rtt_ms{{{}}} {:.2}",
            hop_labels(report, hop),
            hop.last_ms
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_avg_rtt_ms{{{}}} {:.2}",
            hop_labels(report, hop),
            hop.avg_ms
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_best_rtt_ms{{{}}} {:.2}",
            hop_labels(report, hop),
            hop.best_ms
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_worst_rtt_ms{{{}}} {:.2}",
            hop_labels(report, hop),
            hop.worst_ms
        ));
    }
    for hop in &responding {
        lines.push(format!(
            "mtr_jitter_ms{{{}}} {:.2}",
            hop_labels(report, hop),
            hop.jitter_ms
        ));
    }

    lines.push(format!(
        "mtr_silent_hops_count{{{base_labels}}} {silent_count}"
    ));
    lines.push(format!(
        "mtr_hop_count{{{base_labels}}} {}",
        report.hops.len()
    ));
    lines.push(format!(
        "mtr_responding_hop_count{{{base_labels}}} {}",
        responding.len()
    ));

    if let Some(last) = report.hops.last() {
        // End-to-end figures come from the summary when one was computed;
        // otherwise fall back to the raw final hop.
        let (loss, rtt, jitter) = match summary {
            Some(s) => (
                s.end_to_end_loss_percent,
                s.end_to_end_rtt_ms,
                s.end_to_end_jitter_ms,
            ),
            None => (last.loss_percent, last.avg_ms, last.jitter_ms),
        };
        lines.push(format!(
            "mtr_end_to_end_loss_percent{{{base_labels}}} {loss:.1}"
        ));
        lines.push(format!(
            "mtr_end_to_end_avg_rtt_ms{{{base_labels}}} {rtt:.2}"
        ));
        lines.push(format!(
            "mtr_end_to_end_jitter_ms{{{base_labels}}} {jitter:.2}"
        ));
    }

    // Presence marker for every hop, silent ones included, so the path
    // topology stays visible to dashboards.
    for hop in &report.hops {
        lines.push(format!("mtr_hop_info{{{}}} 1", hop_labels(report, hop)));
    }

    lines.join("\n")
}

fn hop_labels(report: &PathReport, hop: &HopRecord) -> String {
    let host = sanitize_label_value(&hop.host, Some(hop.index));
    let responding = if hop.is_responding() { "true" } else { "false" };
    label_string(
        report,
        &[
            ("hop", hop.index.to_string()),
            ("host", host),
            ("responding", responding.to_string()),
        ],
    )
}

/// Custom labels first (already sorted), then target and probe, then any
/// metric-specific labels, every value sanitized.
fn label_string(report: &PathReport, extra: &[(&str, String)]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (key, value) in &report.labels {
        parts.push(format!("{key}=\"{}\"", sanitize_label_value(value, None)));
    }
    parts.push(format!(
        "target=\"{}\"",
        sanitize_label_value(&report.target, None)
    ));
    parts.push(format!(
        "probe=\"{}\"",
        sanitize_label_value(&report.probe, None)
    ));
    for (key, value) in extra {
        parts.push(format!("{key}=\"{}\"", sanitize_label_value(value, None)));
    }

    parts.join(",")
}
