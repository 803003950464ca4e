use std::env;

use anyhow::{Context, Result};
use db::pg::run_migrations;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

/// Creates throwaway databases on the server named by `TEST_ADMIN_URL` (or `DATABASE_URL`).
pub struct DbFixture {
    admin_url: String,
}

impl DbFixture {
    pub fn from_env() -> Result<Self> {
        let admin_url = env::var("TEST_ADMIN_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .context("TEST_ADMIN_URL or DATABASE_URL must be set for tests")?;
        Ok(Self { admin_url })
    }

    pub async fn create(&self, prefix: &str) -> Result<DatabaseHandle> {
        let name = format!("{}_{}", prefix, Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        admin_pool
            .execute(format!("CREATE DATABASE \"{}\"", name).as_str())
            .await?;
        let database_url = format!("{}/{}", self.admin_url.trim_end_matches('/'), name);
        let pool = PgPool::connect(&database_url).await?;
        run_migrations(&pool).await?;
        Ok(DatabaseHandle {
            pool,
            name,
            database_url,
            admin_url: self.admin_url.clone(),
        })
    }
}

pub struct DatabaseHandle {
    pool: PgPool,
    name: String,
    database_url: String,
    admin_url: String,
}

impl DatabaseHandle {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;
        let admin_pool = PgPool::connect(&self.admin_url).await?;
        let terminate_sql = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.name
        );
        admin_pool.execute(terminate_sql.as_str()).await?;
        let drop_sql = format!("DROP DATABASE IF EXISTS \"{}\"", self.name);
        admin_pool.execute(drop_sql.as_str()).await?;
        Ok(())
    }
}
