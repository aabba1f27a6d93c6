use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
}

/// Account lookups needed by authentication and verification.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    /// Returns false when the user does not exist.
    async fn mark_email_verified(&self, id: i64, at: DateTime<Utc>) -> Result<bool, DatabaseError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, is_admin, email_verified_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, is_admin, email_verified_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn mark_email_verified(&self, id: i64, at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET email_verified_at = COALESCE(email_verified_at, $2), updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
