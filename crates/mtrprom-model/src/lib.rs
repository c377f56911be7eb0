//! Shared data structures for mtrprom.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One measured hop along the path. A hop with `loss_percent == 100` is a
/// "silent" hop: it forwards traffic but never answers probes, so its RTT
/// fields carry the most recent known values (or zero).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HopRecord {
    pub index: u32,
    pub host: String,
    pub loss_percent: f64,
    pub sent: u64,
    pub last_ms: f64,
    pub avg_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub jitter_ms: f64,
}

impl HopRecord {
    pub fn is_responding(&self) -> bool {
        self.loss_percent < 100.0
    }
}

/// Probe transport. ICMP ignores the port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Icmp => "icmp",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    /// Whether the port number is meaningful for this transport.
    pub fn uses_port(self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "icmp" => Ok(Protocol::Icmp),
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(format!("unknown protocol: {other}")),
        }
    }
}

/// One completed probe: the ordered hop sequence plus the report-level
/// metadata the renderer needs. Hop order is encounter order and is never
/// re-sorted. Custom labels are kept sorted so rendering is byte-stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathReport {
    pub target: String,
    pub protocol: Protocol,
    pub port: u16,
    pub probe: String,
    pub labels: BTreeMap<String, String>,
    pub hops: Vec<HopRecord>,
}

/// Ordered health grade, derived from end-to-end loss first and the
/// composite score second.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "EXCELLENT",
            HealthStatus::Good => "GOOD",
            HealthStatus::Fair => "FAIR",
            HealthStatus::Poor => "POOR",
            HealthStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived per-run snapshot of path quality. Recomputed from scratch for
/// every report; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathHealthSummary {
    pub hop_count: usize,
    pub responding_hop_count: usize,
    pub end_to_end_loss_percent: f64,
    pub end_to_end_rtt_ms: f64,
    pub end_to_end_jitter_ms: f64,
    pub avg_loss_percent: f64,
    pub avg_jitter_ms: f64,
    pub max_jitter_ms: f64,
    pub rtt_variance_ms: f64,
    pub health_score: f64,
    pub health_status: HealthStatus,
}
