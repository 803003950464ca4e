use std::sync::Arc;

use classifier::MlEstimator;
use common::text::message_digest;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::features::extract_signals;
use crate::policy::ScoringPolicy;
use crate::rules::RuleEngine;

pub const MAX_CONFIDENCE: f64 = 100.0;

/// Result of scoring one message. Component scores are reported before the cap; only
/// `final_confidence` is bounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub ml_score: f64,
    pub url_risk: u64,
    pub keyword_risk: u64,
    pub final_confidence: f64,
    pub is_scam: bool,
    pub urls_detected: Vec<String>,
    pub reasons: Vec<String>,
    pub policy_version: String,
}

/// Additive fusion capped at [`MAX_CONFIDENCE`].
pub fn fuse(ml_score: f64, url_risk: u64, keyword_risk: u64) -> f64 {
    (ml_score + url_risk as f64 + keyword_risk as f64).min(MAX_CONFIDENCE)
}

/// The threshold is inclusive.
pub fn is_scam(confidence: f64, threshold: f64) -> bool {
    confidence >= threshold
}

/// Scores messages against one fixed policy and one trained model. Cheap to clone and safe
/// to share between threads.
#[derive(Debug, Clone)]
pub struct Scorer {
    policy: Arc<ScoringPolicy>,
    estimator: MlEstimator,
}

impl Scorer {
    pub fn new(policy: Arc<ScoringPolicy>, estimator: MlEstimator) -> Self {
        Self { policy, estimator }
    }

    pub fn policy(&self) -> &Arc<ScoringPolicy> {
        &self.policy
    }

    /// Same model, different policy.
    pub fn with_policy(&self, policy: Arc<ScoringPolicy>) -> Self {
        Self {
            policy,
            estimator: self.estimator.clone(),
        }
    }

    #[instrument(
        skip_all,
        fields(digest = %message_digest(text), policy = %self.policy.version())
    )]
    pub fn score(&self, text: &str) -> ScoreBreakdown {
        let signals = extract_signals(text);
        let ml_score = self.estimator.ml_score(&signals.cleaned);

        let engine = RuleEngine::new(&self.policy);
        let url = engine.url_risk(&signals.urls);
        let keyword = engine.keyword_risk(text);

        let final_confidence = fuse(ml_score, url.points, keyword.points);
        let mut reasons = url.reasons;
        reasons.extend(keyword.reasons);
        debug!(ml_score, final_confidence, reasons = reasons.len(), "fused scores");

        ScoreBreakdown {
            ml_score,
            url_risk: url.points,
            keyword_risk: keyword.points,
            final_confidence,
            is_scam: is_scam(final_confidence, self.policy.threshold()),
            urls_detected: signals.urls,
            reasons,
            policy_version: engine.version().to_owned(),
        }
    }
}
