use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ReportRow {
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

#[derive(Debug, Clone, PartialEq)]
pub struct ReportInsert {
    pub message: String,
    pub scam: bool,
    pub confidence: f64,
    pub ml_score: f64,
    pub url_risk: i64,
    pub keyword_risk: i64,
    pub urls: Vec<String>,
    pub reasons: Vec<String>,
    pub policy_version: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub scam: Option<bool>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictTotals {
    pub total: i64,
    pub scam: i64,
    pub safe: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportAnalytics {
    pub totals: VerdictTotals,
    pub daily: Vec<DailyCount>,
}
