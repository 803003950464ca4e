use std::sync::Arc;
use std::time::Instant;

use analysis::ScorerHandle;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use common::text::message_digest;
use db::models::ReportQuery;
use db::Repositories;
use prometheus::Encoder;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{
    report_insert, AnalyticsDto, PolicyDto, PredictRequest, PredictResponse, ReportDto,
};
use crate::error::{ApiError, ApiResult};
use crate::metrics;

const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct ApiState {
    pub scorer: Arc<ScorerHandle>,
    pub repositories: Arc<dyn Repositories>,
    pub metrics_path: &'static str,
    pub history_limit: i64,
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let metrics_path: &'static str = state.metrics_path;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/predict", post(predict))
        .route("/history", get(history))
        .route("/analytics", get(analytics))
        .route("/admin/policy", get(current_policy))
        .route("/admin/policy/reload", post(reload_policy))
        .route(metrics_path, get(metrics_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip(state, request))]
async fn predict(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    let scorer = state.scorer.current();
    let started = Instant::now();
    let breakdown = scorer.score(&request.text);
    metrics::SCORING_DURATION.observe(started.elapsed().as_secs_f64());
    metrics::PREDICTIONS_TOTAL
        .with_label_values(&[metrics::verdict_label(breakdown.is_scam)])
        .inc();
    metrics::CONFIDENCE.observe(breakdown.final_confidence);

    info!(
        digest = %message_digest(&request.text),
        scam = breakdown.is_scam,
        confidence = breakdown.final_confidence,
        ml_score = breakdown.ml_score,
        url_risk = breakdown.url_risk,
        keyword_risk = breakdown.keyword_risk,
        urls = breakdown.urls_detected.len(),
        policy = %breakdown.policy_version,
        "message scored"
    );

    let stored = state
        .repositories
        .reports()
        .insert(report_insert(request.text, &breakdown))
        .await?;

    Ok(Json(PredictResponse::new(stored.id, breakdown)))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
    scam: Option<bool>,
    since: Option<String>,
}

#[instrument(skip(state))]
async fn history(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ReportDto>>> {
    let report_query = ReportQuery {
        scam: query.scam,
        since: match query.since {
            Some(ref value) => Some(parse_since(value)?),
            None => None,
        },
        limit: Some(
            query
                .limit
                .unwrap_or(state.history_limit)
                .clamp(1, MAX_HISTORY_LIMIT),
        ),
    };
    let rows = state.repositories.reports().query(report_query).await?;
    Ok(Json(rows.into_iter().map(ReportDto::from).collect()))
}

#[instrument(skip(state))]
async fn analytics(State(state): State<Arc<ApiState>>) -> ApiResult<Json<AnalyticsDto>> {
    let analytics = state.repositories.reports().analytics().await?;
    Ok(Json(AnalyticsDto::from(analytics)))
}

async fn current_policy(State(state): State<Arc<ApiState>>) -> Json<PolicyDto> {
    let scorer = state.scorer.current();
    Json(PolicyDto::from(scorer.policy().as_ref()))
}

#[instrument(skip(state))]
async fn reload_policy(State(state): State<Arc<ApiState>>) -> ApiResult<Json<PolicyDto>> {
    match state.scorer.reload() {
        Ok(policy) => {
            metrics::POLICY_RELOADS_TOTAL
                .with_label_values(&["applied"])
                .inc();
            Ok(Json(PolicyDto::from(policy.as_ref())))
        }
        Err(err) => {
            metrics::POLICY_RELOADS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            Err(err.into())
        }
    }
}

async fn metrics_handler() -> ApiResult<impl IntoResponse> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let content_type = encoder.format_type().to_string();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        axum::http::StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, content_type)],
        buffer,
    ))
}

fn parse_since(value: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(ApiError::bad_request("invalid since parameter"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_accepts_date_and_timestamp() {
        let day = parse_since("2024-03-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let ts = parse_since("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:30:00+00:00");
        assert!(parse_since("yesterday").is_err());
    }
}
