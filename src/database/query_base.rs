use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;
use crate::database::manager::DatabaseError;
use crate::query::types::{SqlParam, SqlQuery};

/// Executes already-built parameterized queries. Knows nothing about sorting,
/// filtering or search.
#[async_trait]
pub trait QueryBase: Send + Sync {
    /// Rows as JSON objects, in the order the query returns them.
    async fn fetch_rows(&self, query: &SqlQuery) -> Result<Vec<Value>, DatabaseError>;

    /// Runs a query selecting a single `count` column.
    async fn fetch_count(&self, query: &SqlQuery) -> Result<i64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

pub struct PgQueryBase {
    pool: PgPool,
    slow_query_threshold: Option<Duration>,
}

impl PgQueryBase {
    pub fn new(pool: PgPool, config: &DatabaseConfig) -> Self {
        let slow_query_threshold = config
            .enable_slow_query_warning
            .then(|| Duration::from_millis(config.slow_query_threshold_ms));
        Self { pool, slow_query_threshold }
    }

    fn observe(&self, sql: &str, started: Instant) {
        let elapsed = started.elapsed();
        match self.slow_query_threshold {
            Some(threshold) if elapsed > threshold => {
                tracing::warn!("Slow query ({} ms): {}", elapsed.as_millis(), sql)
            }
            _ => tracing::debug!("Query ({} ms): {}", elapsed.as_millis(), sql),
        }
    }
}

#[async_trait]
impl QueryBase for PgQueryBase {
    async fn fetch_rows(&self, query: &SqlQuery) -> Result<Vec<Value>, DatabaseError> {
        let sql = format!("SELECT row_to_json(t) AS row FROM ({}) t", query.query);
        let started = Instant::now();

        let mut q = sqlx::query(&sql);
        for p in query.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        self.observe(&query.query, started);

        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    async fn fetch_count(&self, query: &SqlQuery) -> Result<i64, DatabaseError> {
        let started = Instant::now();

        let mut q = sqlx::query(&query.query);
        for p in query.params.iter() {
            q = bind_param(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        self.observe(&query.query, started);

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        crate::database::DatabaseManager::health_check(&self.pool).await
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Bool(b) => q.bind(*b),
    }
}
