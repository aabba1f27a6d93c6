use serde_json::Value;

use crate::error::ApiError;
use crate::handlers;
use crate::models::Ingredient;
use crate::query::{OrganizedQuery, Page};
use crate::router::RequestContext;
use crate::state::AppState;

/// GET /ingredients - Organizable, paginated list
pub async fn index(ctx: RequestContext<AppState>) -> Result<Page<Value>, ApiError> {
    handlers::list(&ctx, OrganizedQuery::for_resource::<Ingredient>()).await
}

/// GET /ingredients/{int:id}
pub async fn show(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let id = ctx.int_param("id")?;
    handlers::find_one(&ctx, OrganizedQuery::for_resource::<Ingredient>(), id, "Ingredient").await
}

/// GET /ingredients/search/{term}
pub async fn search(ctx: RequestContext<AppState>) -> Result<Page<Value>, ApiError> {
    let term = ctx.str_param("term")?.to_string();
    handlers::search(&ctx, OrganizedQuery::for_resource::<Ingredient>(), &term).await
}
