use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::auth::{TokenRecord, TokenType};
use crate::database::manager::DatabaseError;

/// Persistence for issued bearer tokens, keyed by token id and group id.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Both halves of a pair are written together.
    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> Result<(), DatabaseError>;

    async fn find(&self, id: Uuid) -> Result<Option<TokenRecord>, DatabaseError>;

    /// Most recent unrevoked demo access token for `owner_id`, regardless of expiry.
    async fn find_demo_access(&self, owner_id: i64) -> Result<Option<TokenRecord>, DatabaseError>;

    /// Flags every token of the group revoked; returns how many changed.
    async fn revoke_group(&self, group_id: Uuid) -> Result<u64, DatabaseError>;
}

pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TOKEN_COLUMNS: &str = "id, group_id, token_type, owner_id, expires_at, revoked, demo";

fn token_from_row(row: &PgRow) -> Result<TokenRecord, DatabaseError> {
    let token_type: String = row.try_get("token_type")?;
    let token_type = token_type
        .parse::<TokenType>()
        .map_err(|_| DatabaseError::QueryError(format!("unknown token type '{}'", token_type)))?;
    let expires_at: DateTime<Utc> = row.try_get("expires_at")?;

    Ok(TokenRecord {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        token_type,
        owner_id: row.try_get("owner_id")?,
        expires_at,
        revoked: row.try_get("revoked")?,
        demo: row.try_get("demo")?,
    })
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> Result<(), DatabaseError> {
        let query = format!(
            "INSERT INTO personal_tokens ({}) VALUES ($1, $2, $3, $4, $5, $6, $7), ($8, $9, $10, $11, $12, $13, $14)",
            TOKEN_COLUMNS
        );

        let mut q = sqlx::query(&query);
        for token in [access, refresh] {
            q = q
                .bind(token.id)
                .bind(token.group_id)
                .bind(token.token_type.as_str())
                .bind(token.owner_id)
                .bind(token.expires_at)
                .bind(token.revoked)
                .bind(token.demo);
        }
        q.execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<TokenRecord>, DatabaseError> {
        let query = format!("SELECT {} FROM personal_tokens WHERE id = $1", TOKEN_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(token_from_row).transpose()
    }

    async fn find_demo_access(&self, owner_id: i64) -> Result<Option<TokenRecord>, DatabaseError> {
        let query = format!(
            r#"
            SELECT {} FROM personal_tokens
            WHERE owner_id = $1
            AND demo = true
            AND token_type = 'access'
            AND revoked = false
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            TOKEN_COLUMNS
        );
        let row = sqlx::query(&query).bind(owner_id).fetch_optional(&self.pool).await?;
        row.as_ref().map(token_from_row).transpose()
    }

    async fn revoke_group(&self, group_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE personal_tokens SET revoked = true WHERE group_id = $1 AND revoked = false",
        )
        .bind(group_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
