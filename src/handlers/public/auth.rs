use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::router::RequestContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/login - Exchange email and password for a token pair
pub async fn login(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let body: LoginRequest = ctx.json()?;

    let user = ctx.state.users.find_by_email(body.email.trim()).await?;
    let Some(user) = user.filter(|u| verify_password(&body.password, &u.password_hash)) else {
        tracing::warn!("Failed login for {}", body.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    let pair = ctx.state.tokens.issue_pair(user.id).await?;
    Ok(json!({ "data": pair }))
}

/// POST /auth/refresh - Rotate a token pair
pub async fn refresh(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let body: RefreshRequest = ctx.json()?;

    match ctx.state.tokens.refresh(&body.refresh_token).await? {
        Some(pair) => Ok(json!({ "data": pair })),
        None => Err(ApiError::unauthorized("Invalid or expired refresh token")),
    }
}

/// GET /auth/email/verify/{int:id}/{hash} - Signed link target
pub async fn verify_email(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let id = ctx.int_param("id")?;
    let hash = ctx.str_param("hash")?;

    let user = ctx
        .state
        .users
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    if email_hash(&user.email) != hash {
        return Err(ApiError::field_error("hash", "Verification hash does not match"));
    }

    if user.email_verified_at.is_none() {
        if !ctx.state.users.mark_email_verified(id, Utc::now()).await? {
            return Err(ApiError::not_found(format!("User {} not found", id)));
        }
        tracing::info!("Verified email for user {}", id);
    }
    Ok(json!({ "data": { "id": id, "verified": true } }))
}

/// Hex SHA-256 of the lowercased address, embedded in verification links.
pub(crate) fn email_hash(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}
