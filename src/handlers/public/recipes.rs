use serde_json::Value;

use crate::error::ApiError;
use crate::handlers;
use crate::models::Recipe;
use crate::query::{OrganizedQuery, Page};
use crate::router::RequestContext;
use crate::state::AppState;

/// Recipes the caller may see: public ones, plus their own. Administrators see all.
fn visible(ctx: &RequestContext<AppState>) -> OrganizedQuery {
    let mut query = OrganizedQuery::for_resource::<Recipe>();
    match ctx.principal() {
        Some(principal) if principal.admin => {}
        Some(principal) => {
            query.scope_any(vec![
                (Recipe::VISIBILITY_COLUMN, true.into()),
                (Recipe::OWNER_COLUMN, principal.id.into()),
            ]);
        }
        None => {
            query.scope_eq(Recipe::VISIBILITY_COLUMN, true);
        }
    }
    query
}

/// GET /recipes - Organizable, paginated list
pub async fn index(ctx: RequestContext<AppState>) -> Result<Page<Value>, ApiError> {
    handlers::list(&ctx, visible(&ctx)).await
}

/// GET /recipes/{int:id} - A recipe the caller cannot see is reported as missing
pub async fn show(ctx: RequestContext<AppState>) -> Result<Value, ApiError> {
    let id = ctx.int_param("id")?;
    handlers::find_one(&ctx, visible(&ctx), id, "Recipe").await
}

/// GET /recipes/search/{term}
pub async fn search(ctx: RequestContext<AppState>) -> Result<Page<Value>, ApiError> {
    let term = ctx.str_param("term")?.to_string();
    handlers::search(&ctx, visible(&ctx), &term).await
}
