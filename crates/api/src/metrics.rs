use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};

pub static PREDICTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fraud_predictions_total",
        "Messages scored by the API grouped by verdict",
        &["verdict"]
    )
    .expect("predictions total")
});

pub static CONFIDENCE: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "fraud_prediction_confidence",
        "Final fused confidence of scored messages",
        vec![10.0, 20.0, 30.0, 40.0, 55.0, 70.0, 85.0, 100.0]
    )
    .expect("confidence histogram")
});

pub static SCORING_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "fraud_scoring_duration_seconds",
        "Time spent scoring a single message",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    )
    .expect("scoring duration histogram")
});

pub static POLICY_RELOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "fraud_policy_reloads_total",
        "Scoring policy reload attempts grouped by outcome",
        &["outcome"]
    )
    .expect("policy reloads total")
});

pub fn verdict_label(is_scam: bool) -> &'static str {
    if is_scam {
        "scam"
    } else {
        "safe"
    }
}
