use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::router::{Flow, Middleware, RequestContext};
use crate::state::AppState;

/// Resolves the bearer credential into the request's principal.
///
/// - no credential: 401 when required, otherwise the request continues anonymous
/// - unknown, expired, revoked, malformed or refresh token: same as no credential
/// - the configured demo credential always resolves to the demo principal
/// - a non-admin principal on an admin stage: 403
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth {
    required: bool,
    admin_required: bool,
}

pub fn require_auth(required: bool, admin_required: bool) -> RequireAuth {
    RequireAuth {
        // An admin check needs someone to check.
        required: required || admin_required,
        admin_required,
    }
}

#[async_trait]
impl Middleware<AppState> for RequireAuth {
    fn name(&self) -> String {
        match (self.required, self.admin_required) {
            (_, true) => "auth:admin",
            (true, false) => "auth:required",
            (false, false) => "auth:optional",
        }
        .to_string()
    }

    async fn handle(&self, ctx: &mut RequestContext<AppState>) -> Result<Flow, ApiError> {
        let token = match extract_bearer_token(&ctx.headers) {
            Ok(Some(token)) => token,
            Ok(None) => {
                if self.required {
                    return Err(ApiError::unauthorized("Missing authorization token"));
                }
                return Ok(Flow::Continue);
            }
            Err(msg) => {
                if self.required {
                    return Err(ApiError::unauthorized(msg));
                }
                tracing::debug!("Ignoring malformed credential on optional route: {}", msg);
                return Ok(Flow::Continue);
            }
        };

        let Some(auth) = ctx.state.tokens.resolve(&token).await? else {
            if self.required {
                return Err(ApiError::unauthorized("Invalid or expired token"));
            }
            tracing::debug!("Continuing unauthenticated after rejected credential");
            return Ok(Flow::Continue);
        };

        if self.admin_required && !auth.principal.admin {
            tracing::warn!("User {} denied admin route {}", auth.principal.id, ctx.path);
            return Err(ApiError::forbidden("Administrator access required"));
        }

        tracing::debug!("Authenticated user {} (demo: {})", auth.principal.id, auth.principal.demo);
        ctx.set_auth(auth);
        Ok(Flow::Continue)
    }
}

/// `Ok(None)` when no Authorization header was sent at all.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, &'static str> {
    let Some(auth_header) = headers.get("authorization") else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
