use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use tokio::time::{sleep, Duration};
use tracing::{instrument, warn};

use crate::errors::{DbError, Result};
use crate::models::{
    DailyCount, ReportAnalytics, ReportInsert, ReportQuery, ReportRow, VerdictTotals,
};
use crate::repositories::{ReportRepository, Repositories};

const REPORT_COLUMNS: &str = "id, message, scam, confidence, ml_score, url_risk, keyword_risk, \
                              urls, reasons, policy_version, created_at";

const DEFAULT_QUERY_LIMIT: i64 = 50;

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(DbError::Migration)
}

#[derive(Clone)]
pub struct PgDatabase {
    report_repo: Arc<PgReportRepository>,
}

impl PgDatabase {
    pub async fn connect(database_url: &str) -> Result<Self> {
        const MAX_ATTEMPTS: u32 = 5;
        const BASE_DELAY_MS: u64 = 500;

        let mut attempts = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    run_migrations(&pool).await?;
                    return Ok(Self::from_pool(pool));
                }
                Err(err) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(DbError::Query(err));
                    }

                    let exp = (attempts - 1).min(5);
                    let backoff = Duration::from_millis(BASE_DELAY_MS * (1u64 << exp));
                    warn!(
                        attempts,
                        error = %err,
                        wait_ms = backoff.as_millis(),
                        "database connection failed; retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let report_repo = Arc::new(PgReportRepository { pool });
        Self { report_repo }
    }

}

impl Repositories for PgDatabase {
    fn reports(&self) -> &dyn ReportRepository {
        &*self.report_repo
    }
}

#[derive(Clone)]
struct PgReportRepository {
    pool: PgPool,
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    #[instrument(skip(self, report), fields(scam = report.scam, confidence = report.confidence))]
    async fn insert(&self, report: ReportInsert) -> Result<ReportRow> {
        let sql = format!(
            r#"
            INSERT INTO reports
                (message, scam, confidence, ml_score, url_risk, keyword_risk, urls, reasons, policy_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {REPORT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ReportRow>(&sql)
            .bind(report.message)
            .bind(report.scam)
            .bind(report.confidence)
            .bind(report.ml_score)
            .bind(report.url_risk)
            .bind(report.keyword_risk)
            .bind(report.urls)
            .bind(report.reasons)
            .bind(report.policy_version)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::Query)
    }

    #[instrument(skip(self))]
    async fn query(&self, query: ReportQuery) -> Result<Vec<ReportRow>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports WHERE TRUE"));
        if let Some(scam) = query.scam {
            builder.push(" AND scam = ").push_bind(scam);
        }
        if let Some(since) = query.since {
            builder.push(" AND created_at >= ").push_bind(since);
        }
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(query.limit.unwrap_or(DEFAULT_QUERY_LIMIT));

        builder
            .build_query_as::<ReportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Query)
    }

    #[instrument(skip(self))]
    async fn analytics(&self) -> Result<ReportAnalytics> {
        let (total, scam, safe): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::BIGINT,
                   COUNT(*) FILTER (WHERE scam)::BIGINT,
                   COUNT(*) FILTER (WHERE NOT scam)::BIGINT
            FROM reports
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::Query)?;

        let daily = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::DATE AS day, COUNT(*)::BIGINT AS count
            FROM reports
            GROUP BY day
            ORDER BY day
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Query)?;

        Ok(ReportAnalytics {
            totals: VerdictTotals { total, scam, safe },
            daily,
        })
    }
}
