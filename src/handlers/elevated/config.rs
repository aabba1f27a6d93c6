use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::router::RequestContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub path: String,
    pub value: Value,
}

/// GET /admin/config - All runtime settings keyed by dotted path
pub async fn show(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let settings = ctx.state.settings.all().await?;
    Ok(json!({ "data": settings }))
}

/// PUT /admin/config - Set one runtime setting
pub async fn update(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let body: ConfigUpdate = ctx.json()?;
    if !is_valid_path(&body.path) {
        return Err(ApiError::field_error(
            "path",
            "Path must be dot-separated segments of lowercase letters, digits and underscores",
        ));
    }

    ctx.state.settings.set(&body.path, &body.value).await?;
    tracing::info!("Setting '{}' updated", body.path);
    Ok(json!({ "data": { "path": body.path, "value": body.value } }))
}

/// `mail.from_address`, `features.signup`; segments of `[a-z0-9_]`, none empty.
fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        })
}
