use analysis::{ScoreBreakdown, ScoringPolicy};
use chrono::{DateTime, NaiveDate, Utc};
use db::models::{ReportAnalytics, ReportInsert, ReportRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub report_id: i64,
    pub scam: bool,
    pub confidence: f64,
    pub ml_score: f64,
    pub url_risk: u64,
    pub keyword_risk: u64,
    pub urls_detected: Vec<String>,
    pub reasons: Vec<String>,
    pub policy_version: String,
}

impl PredictResponse {
    pub fn new(report_id: i64, breakdown: ScoreBreakdown) -> Self {
        Self {
            report_id,
            scam: breakdown.is_scam,
            confidence: round2(breakdown.final_confidence),
            ml_score: round2(breakdown.ml_score),
            url_risk: breakdown.url_risk,
            keyword_risk: breakdown.keyword_risk,
            urls_detected: breakdown.urls_detected,
            reasons: breakdown.reasons,
            policy_version: breakdown.policy_version,
        }
    }
}

/// The stored report keeps unrounded scores.
pub fn report_insert(message: String, breakdown: &ScoreBreakdown) -> ReportInsert {
    ReportInsert {
        message,
        scam: breakdown.is_scam,
        confidence: breakdown.final_confidence,
        ml_score: breakdown.ml_score,
        url_risk: clamp_i64(breakdown.url_risk),
        keyword_risk: clamp_i64(breakdown.keyword_risk),
        urls: breakdown.urls_detected.clone(),
        reasons: breakdown.reasons.clone(),
        policy_version: breakdown.policy_version.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub id: i64,
    pub message: String,
    pub scam: bool,
    pub confidence: f64,
    pub ml_score: f64,
    pub url_risk: i64,
    pub keyword_risk: i64,
    pub urls: Vec<String>,
    pub reasons: Vec<String>,
    pub policy_version: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReportRow> for ReportDto {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            message: row.message,
            scam: row.scam,
            confidence: round2(row.confidence),
            ml_score: round2(row.ml_score),
            url_risk: row.url_risk,
            keyword_risk: row.keyword_risk,
            urls: row.urls,
            reasons: row.reasons,
            policy_version: row.policy_version,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyCountDto {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsDto {
    pub total: i64,
    pub scam: i64,
    pub safe: i64,
    pub daily: Vec<DailyCountDto>,
}

impl From<ReportAnalytics> for AnalyticsDto {
    fn from(analytics: ReportAnalytics) -> Self {
        Self {
            total: analytics.totals.total,
            scam: analytics.totals.scam,
            safe: analytics.totals.safe,
            daily: analytics
                .daily
                .into_iter()
                .map(|d| DailyCountDto {
                    day: d.day,
                    count: d.count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyDto {
    pub version: String,
    pub threshold: f64,
    pub keywords: usize,
    pub short_domains: usize,
    pub brands: usize,
    pub suspicious_tlds: usize,
}

impl From<&ScoringPolicy> for PolicyDto {
    fn from(policy: &ScoringPolicy) -> Self {
        Self {
            version: policy.version().to_owned(),
            threshold: policy.threshold(),
            keywords: policy.keywords().len(),
            short_domains: policy.short_domains().len(),
            brands: policy.brands().len(),
            suspicious_tlds: policy.suspicious_tlds().len(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(73.14159), 73.14);
        assert_eq!(round2(54.999), 55.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
