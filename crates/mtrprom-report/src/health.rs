use mtrprom_model::{HealthStatus, HopRecord, PathHealthSummary};

/// Scoring parameters. The defaults are heuristic calibration carried over
/// from field use; callers tuning them keep the same shape: per-unit
/// penalties with hard caps so no single factor dominates the score.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthWeights {
    pub loss_penalty_per_percent: f64,
    pub jitter_penalty_per_ms: f64,
    pub jitter_penalty_cap: f64,
    pub rtt_penalty_per_ms: f64,
    pub rtt_penalty_cap: f64,
    pub variance_penalty_per_ms: f64,
    pub variance_penalty_cap: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            loss_penalty_per_percent: 2.0,
            jitter_penalty_per_ms: 0.5,
            jitter_penalty_cap: 20.0,
            rtt_penalty_per_ms: 0.1,
            rtt_penalty_cap: 20.0,
            variance_penalty_per_ms: 0.05,
            variance_penalty_cap: 10.0,
        }
    }
}

/// Reduce a hop sequence to one health snapshot with the default weights.
/// Returns None for an empty sequence; callers must treat that as "no data",
/// not as zeroed metrics.
pub fn summarize(hops: &[HopRecord]) -> Option<PathHealthSummary> {
    summarize_with(hops, &HealthWeights::default())
}

pub fn summarize_with(hops: &[HopRecord], weights: &HealthWeights) -> Option<PathHealthSummary> {
    if hops.is_empty() {
        return None;
    }

    let responding: Vec<&HopRecord> = hops.iter().filter(|hop| hop.is_responding()).collect();

    // End-to-end reference: the last hop that answered, or the last hop
    // overall when the whole path is silent.
    let reference = match responding.last() {
        Some(hop) => *hop,
        None => hops.last()?,
    };
    let end_to_end_loss_percent = reference.loss_percent;
    let end_to_end_rtt_ms = reference.avg_ms;
    let end_to_end_jitter_ms = reference.jitter_ms;

    let (avg_loss_percent, avg_jitter_ms, max_jitter_ms, rtt_variance_ms) =
        if responding.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let n = responding.len() as f64;
            let avg_loss = responding.iter().map(|hop| hop.loss_percent).sum::<f64>() / n;
            let avg_jitter = responding.iter().map(|hop| hop.jitter_ms).sum::<f64>() / n;
            let max_jitter = responding
                .iter()
                .map(|hop| hop.jitter_ms)
                .fold(0.0, f64::max);
            let variance = if responding.len() > 1 {
                let min_rtt = responding
                    .iter()
                    .map(|hop| hop.avg_ms)
                    .fold(f64::INFINITY, f64::min);
                let max_rtt = responding
                    .iter()
                    .map(|hop| hop.avg_ms)
                    .fold(f64::NEG_INFINITY, f64::max);
                max_rtt - min_rtt
            } else {
                0.0
            };
            (avg_loss, avg_jitter, max_jitter, variance)
        };

    let loss_penalty = end_to_end_loss_percent * weights.loss_penalty_per_percent;
    let jitter_penalty =
        (end_to_end_jitter_ms * weights.jitter_penalty_per_ms).min(weights.jitter_penalty_cap);
    let rtt_penalty = (end_to_end_rtt_ms * weights.rtt_penalty_per_ms).min(weights.rtt_penalty_cap);
    let variance_penalty =
        (rtt_variance_ms * weights.variance_penalty_per_ms).min(weights.variance_penalty_cap);

    let health_score = (100.0 - loss_penalty - jitter_penalty - rtt_penalty - variance_penalty)
        .clamp(0.0, 100.0);

    // End-to-end loss is the strongest user-visible signal; it overrides an
    // otherwise-decent composite score.
    let health_status = if end_to_end_loss_percent > 50.0 {
        HealthStatus::Critical
    } else if end_to_end_loss_percent > 10.0 {
        HealthStatus::Poor
    } else if health_score >= 90.0 {
        HealthStatus::Excellent
    } else if health_score >= 75.0 {
        HealthStatus::Good
    } else if health_score >= 60.0 {
        HealthStatus::Fair
    } else {
        HealthStatus::Poor
    };

    Some(PathHealthSummary {
        hop_count: hops.len(),
        responding_hop_count: responding.len(),
        end_to_end_loss_percent,
        end_to_end_rtt_ms,
        end_to_end_jitter_ms,
        avg_loss_percent,
        avg_jitter_ms,
        max_jitter_ms,
        rtt_variance_ms,
        health_score,
        health_status,
    })
}
