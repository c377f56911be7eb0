use mtrprom_model::{HealthStatus, HopRecord};
use mtrprom_report::{summarize, summarize_with, HealthWeights};

fn hop(index: u32, loss: f64, avg: f64, jitter: f64) -> HopRecord {
    HopRecord {
        index,
        host: format!("10.0.0.{index}"),
        loss_percent: loss,
        sent: 10,
        last_ms: avg,
        avg_ms: avg,
        best_ms: avg,
        worst_ms: avg,
        jitter_ms: jitter,
    }
}

#[test]
fn clean_path_scores_excellent() {
    let hops = vec![hop(1, 0.0, 1.6, 0.1), hop(2, 0.0, 9.8, 1.0), hop(3, 0.0, 15.1, 0.3)];
    let summary = summarize(&hops).unwrap();

    assert_eq!(summary.hop_count, 3);
    assert_eq!(summary.responding_hop_count, 3);
    assert_eq!(summary.end_to_end_loss_percent, 0.0);
    assert_eq!(summary.end_to_end_rtt_ms, 15.1);
    // 100 - 0 - 0.15 (jitter) - 1.51 (rtt) - 0.675 (variance of 13.5ms)
    assert!((summary.health_score - 97.665).abs() < 1e-9);
    assert_eq!(summary.health_status, HealthStatus::Excellent);
    assert!((summary.rtt_variance_ms - 13.5).abs() < 1e-9);
}

#[test]
fn silent_tail_uses_last_responding_hop() {
    let hops = vec![hop(1, 0.0, 1.6, 0.1), hop(2, 0.0, 9.8, 1.0), hop(3, 100.0, 0.0, 0.0)];
    let summary = summarize(&hops).unwrap();

    assert_eq!(summary.responding_hop_count, 2);
    assert_eq!(summary.end_to_end_loss_percent, 0.0);
    assert_eq!(summary.end_to_end_rtt_ms, 9.8);
    assert_eq!(summary.end_to_end_jitter_ms, 1.0);
}

#[test]
fn fully_silent_path_is_critical() {
    let hops = vec![hop(1, 100.0, 0.0, 0.0)];
    let summary = summarize(&hops).unwrap();

    assert_eq!(summary.responding_hop_count, 0);
    assert_eq!(summary.end_to_end_loss_percent, 100.0);
    assert_eq!(summary.health_status, HealthStatus::Critical);
    assert_eq!(summary.health_score, 0.0);
    assert_eq!(summary.avg_jitter_ms, 0.0);
    assert_eq!(summary.rtt_variance_ms, 0.0);
}

#[test]
fn status_is_loss_dominant() {
    // 12% end-to-end loss with otherwise perfect numbers: the composite
    // score alone would grade GOOD, but loss overrides.
    let hops = vec![hop(1, 12.0, 1.0, 0.0)];
    let summary = summarize(&hops).unwrap();
    assert!(summary.health_score >= 75.0);
    assert_eq!(summary.health_status, HealthStatus::Poor);

    let hops = vec![hop(1, 51.0, 1.0, 0.0)];
    let summary = summarize(&hops).unwrap();
    assert_eq!(summary.health_status, HealthStatus::Critical);
}

#[test]
fn score_is_monotonic_in_loss_and_bounded() {
    let mut previous = f64::INFINITY;
    for loss in [0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0] {
        let hops = vec![hop(1, loss, 20.0, 4.0)];
        let summary = summarize(&hops).unwrap();
        assert!(summary.health_score <= previous);
        assert!((0.0..=100.0).contains(&summary.health_score));
        previous = summary.health_score;
    }
}

#[test]
fn penalties_are_capped() {
    // Extreme RTT and jitter on a lossless path: 20 + 20 + 0 variance.
    let hops = vec![hop(1, 0.0, 5000.0, 5000.0)];
    let summary = summarize(&hops).unwrap();
    assert_eq!(summary.health_score, 60.0);
    assert_eq!(summary.health_status, HealthStatus::Fair);
}

#[test]
fn custom_weights_change_the_score() {
    let weights = HealthWeights {
        loss_penalty_per_percent: 1.0,
        ..HealthWeights::default()
    };
    let hops = vec![hop(1, 10.0, 0.0, 0.0)];
    let summary = summarize_with(&hops, &weights).unwrap();
    assert_eq!(summary.health_score, 90.0);
}

#[test]
fn empty_input_yields_no_summary() {
    assert!(summarize(&[]).is_none());
}
