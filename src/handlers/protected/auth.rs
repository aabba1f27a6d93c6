use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::handlers::public::auth::email_hash;
use crate::router::{Reply, RequestContext};
use crate::routes::VERIFY_EMAIL_ROUTE;
use crate::state::AppState;

/// GET /auth/me - The authenticated principal
pub async fn me(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let principal = ctx.require_principal()?;
    let user = ctx.state.users.find(principal.id).await?;

    Ok(json!({
        "data": {
            "id": principal.id,
            "admin": principal.admin,
            "email_verified": principal.email_verified,
            "demo": principal.demo,
            "name": user.as_ref().map(|u| u.name.clone()),
            "email": user.as_ref().map(|u| u.email.clone()),
        }
    }))
}

/// POST /auth/logout - Revoke the caller's token group. The demo session is shared,
/// so logging out of it does nothing.
pub async fn logout(ctx: RequestContext<AppState>) -> Result<Reply, ApiError> {
    let auth = ctx.require_auth()?;
    if auth.principal.demo {
        tracing::debug!("Ignoring logout of the demo session");
        return Ok(Reply::Empty);
    }

    ctx.state.tokens.revoke(auth.group_id).await?;
    Ok(Reply::Empty)
}

/// POST /auth/email/verification - Signed parameters for the verification link
pub async fn verification_link(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let principal = ctx.require_principal()?;
    let user = ctx
        .state
        .users
        .find(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", principal.id)))?;

    let mut params = BTreeMap::new();
    params.insert("id".to_string(), user.id.to_string());
    params.insert("hash".to_string(), email_hash(&user.email));

    let ttl = Duration::minutes(ctx.state.config.security.signed_link_ttl_minutes);
    let signed = ctx.state.signer.build_signed_parameters(
        &ctx.state.urls,
        VERIFY_EMAIL_ROUTE,
        &params,
        Some(Utc::now() + ttl),
    )?;

    let mut link = params.clone();
    link.extend(signed.clone());
    let url = ctx.state.urls.url_for(VERIFY_EMAIL_ROUTE, &link)?;

    Ok(json!({
        "data": {
            "id": user.id,
            "hash": link.get("hash"),
            "expires": signed.get("expires"),
            "signature": signed.get("signature"),
            "url": url,
        }
    }))
}
