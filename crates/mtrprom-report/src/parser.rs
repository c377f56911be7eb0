use mtrprom_model::HopRecord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ParseError;

/// Which decode path produced the hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Structured,
    Textual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub format: SourceFormat,
    pub hops: Vec<HopRecord>,
}

/// Decode a completed mtr report. The structured (JSON) shape is attempted
/// first; a malformed or unrecognizable payload falls back to the textual
/// report grammar on the same bytes. Fails only when both paths yield zero
/// hops.
pub fn parse_report(raw: &str) -> Result<ParsedReport, ParseError> {
    if let Some(hops) = parse_structured(raw) {
        if !hops.is_empty() {
            debug!(hops = hops.len(), "decoded structured report");
            return Ok(ParsedReport {
                format: SourceFormat::Structured,
                hops,
            });
        }
    }

    let hops = parse_text(raw);
    if hops.is_empty() {
        return Err(ParseError::NoHopsFound);
    }
    debug!(hops = hops.len(), "decoded textual report");
    Ok(ParsedReport {
        format: SourceFormat::Textual,
        hops,
    })
}

/// JSON report shape: `{"report": {"hubs": [{"count": .., "host": ..,
/// "Loss%": .., "Snt": .., "Last": .., "Avg": .., "Best": .., "Wrst": ..,
/// "StDev": ..}, ..]}}`. Missing optional fields take defaults; numeric
/// fields that arrive as strings are coerced. Returns None when the payload
/// is not JSON or lacks the report section.
fn parse_structured(raw: &str) -> Option<Vec<HopRecord>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let hubs = value.get("report")?.get("hubs")?.as_array()?;

    Some(hubs.iter().map(hop_from_entry).collect())
}

fn hop_from_entry(entry: &Value) -> HopRecord {
    HopRecord {
        index: field_u64(entry, "count") as u32,
        host: entry
            .get("host")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        loss_percent: field_f64(entry, "Loss%"),
        sent: field_u64(entry, "Snt"),
        last_ms: field_f64(entry, "Last"),
        avg_ms: field_f64(entry, "Avg"),
        best_ms: field_f64(entry, "Best"),
        worst_ms: field_f64(entry, "Wrst"),
        jitter_ms: field_f64(entry, "StDev"),
    }
}

fn field_f64(entry: &Value, key: &str) -> f64 {
    match entry.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn field_u64(entry: &Value, key: &str) -> u64 {
    match entry.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Textual report grammar, e.g.
/// `  1.|-- _gateway   0.0%    10  1.6  1.6  1.6  1.8  0.1`.
/// Header lines and anything that fails to tokenize are skipped with a
/// warning; surviving hops keep their encounter order.
fn parse_text(raw: &str) -> Vec<HopRecord> {
    let mut hops = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Start:") || line.starts_with("HOST:") {
            continue;
        }
        if !is_hop_line(line) {
            continue;
        }

        match parse_hop_line(line) {
            Some(hop) => hops.push(hop),
            None => warn!(line, "skipping unparseable hop line"),
        }
    }

    hops
}

fn is_hop_line(line: &str) -> bool {
    line.contains("|--") || (line.contains('|') && !line.starts_with('|'))
}

fn parse_hop_line(line: &str) -> Option<HopRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return None;
    }

    // Hop ordinal is the integer prefix of the first token, up to the dot
    // in "1.|--".
    let index_str = tokens[0].split('.').next()?;
    let index: u32 = index_str.parse().ok()?;

    // "???" marks a hop that never answered; synthesize a stable placeholder.
    let host = if tokens[1] == "???" {
        format!("hop_{index}")
    } else {
        tokens[1].to_string()
    };

    let loss_idx = tokens.iter().position(|tok| tok.ends_with('%'))?;
    let loss_percent: f64 = tokens[loss_idx].trim_end_matches('%').parse().ok()?;

    // Fixed-order numeric tail: sent, last, avg, best, worst, then an
    // optional jitter column.
    let tail = &tokens[loss_idx + 1..];
    if tail.len() < 5 {
        return None;
    }
    let sent: u64 = tail[0].parse().ok()?;
    let last_ms: f64 = tail[1].parse().ok()?;
    let avg_ms: f64 = tail[2].parse().ok()?;
    let best_ms: f64 = tail[3].parse().ok()?;
    let worst_ms: f64 = tail[4].parse().ok()?;
    let jitter_ms: f64 = match tail.get(5) {
        Some(tok) => tok.parse().ok()?,
        None => 0.0,
    };

    Some(HopRecord {
        index,
        host,
        loss_percent,
        sent,
        last_ms,
        avg_ms,
        best_ms,
        worst_ms,
        jitter_ms,
    })
}
