pub mod elevated;
pub mod protected;
pub mod public;

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::query::{paginate, require_search_term, OrganizedQuery, Page, QueryIntent};
use crate::router::RequestContext;
use crate::state::AppState;

/// Organize `query` from the request's sort/filter/search/page parameters and paginate it.
pub(crate) async fn list(ctx: &RequestContext<AppState>, mut query: OrganizedQuery) -> Result<Page<Value>, ApiError> {
    let intent = QueryIntent::from_query_string(ctx.query.as_deref(), &ctx.state.config.query)?;
    query.organize(&intent)?;
    Ok(paginate(ctx.state.query_base.as_ref(), &query, intent.page).await?)
}

/// Like [`list`], but the search term comes from the path and must be long enough.
pub(crate) async fn search(
    ctx: &RequestContext<AppState>,
    mut query: OrganizedQuery,
    term: &str,
) -> Result<Page<Value>, ApiError> {
    let term = require_search_term(term)?;
    let intent = QueryIntent::from_query_string(ctx.query.as_deref(), &ctx.state.config.query)?;
    query.organize(&intent)?;
    query.apply_search(Some(term));
    Ok(paginate(ctx.state.query_base.as_ref(), &query, intent.page).await?)
}

/// Single record by primary key within `query`'s scope, as `{"data": record}`.
pub(crate) async fn find_one(
    ctx: &RequestContext<AppState>,
    mut query: OrganizedQuery,
    id: i64,
    label: &str,
) -> Result<Value, ApiError> {
    let primary_key = query.resource().primary_key;
    query.scope_eq(primary_key, id);

    let rows = ctx.state.query_base.fetch_rows(&query.to_select_sql(Some(1), None)).await?;
    match rows.into_iter().next() {
        Some(row) => Ok(json!({ "data": row })),
        None => Err(ApiError::not_found(format!("{} {} not found", label, id))),
    }
}
