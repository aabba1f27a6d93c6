use serde_json::{json, Value};

use crate::error::ApiError;
use crate::router::RequestContext;
use crate::state::AppState;

/// GET / - Service information
pub async fn root(_ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    Ok(json!({
        "data": {
            "name": "Recipe API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/refresh (public); /auth/me, /auth/logout, /auth/email/verification (bearer)",
                "recipes": "/recipes[/{id}], /recipes/search/{term} (optional bearer)",
                "ingredients": "/ingredients[/{id}], /ingredients/search/{term} (public)",
                "admin": "/admin/users, /admin/config (admin bearer)",
            }
        }
    }))
}

/// GET /health - Datastore connectivity
pub async fn health(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    if let Err(e) = ctx.state.query_base.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(json!({
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    }))
}
