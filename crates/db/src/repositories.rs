use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{ReportAnalytics, ReportInsert, ReportQuery, ReportRow};

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, report: ReportInsert) -> Result<ReportRow>;
    /// Most recent first.
    async fn query(&self, query: ReportQuery) -> Result<Vec<ReportRow>>;
    async fn analytics(&self) -> Result<ReportAnalytics>;
}

pub trait Repositories: Send + Sync {
    fn reports(&self) -> &dyn ReportRepository;
}
