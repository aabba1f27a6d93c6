use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool, Row};

use crate::database::manager::DatabaseError;

/// Runtime-editable application settings, addressed by dotted path.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn all(&self) -> Result<Map<String, Value>, DatabaseError>;

    async fn set(&self, path: &str, value: &Value) -> Result<(), DatabaseError>;
}

pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn all(&self) -> Result<Map<String, Value>, DatabaseError> {
        let rows = sqlx::query("SELECT path, value FROM settings ORDER BY path")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Map::new();
        for row in rows {
            let path: String = row.try_get("path")?;
            let value: Value = row.try_get("value")?;
            out.insert(path, value);
        }
        Ok(out)
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO settings (path, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (path) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(path)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
