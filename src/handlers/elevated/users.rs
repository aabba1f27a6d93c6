use serde_json::Value;

use crate::error::ApiError;
use crate::handlers;
use crate::models::AdminUser;
use crate::query::{OrganizedQuery, Page};
use crate::router::RequestContext;
use crate::state::AppState;

/// GET /admin/users - Organizable, paginated user list
pub async fn index(ctx: RequestContext<AppState>) -> Result<Page<Value>, ApiError> {
    handlers::list(&ctx, OrganizedQuery::for_resource::<AdminUser>()).await
}
