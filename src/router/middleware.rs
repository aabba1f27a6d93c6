use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

use crate::error::ApiError;

use super::context::RequestContext;

/// Outcome of one pipeline stage.
pub enum Flow {
    Continue,
    /// Stop here; later stages and the handler never run.
    Respond(Response),
}

/// A stage in a route's pipeline. Returning `Err` short-circuits like `Flow::Respond`
/// with the error's rendered response.
#[async_trait]
pub trait Middleware<S: Send + Sync>: Send + Sync {
    /// Label used in route listings.
    fn name(&self) -> String;

    async fn handle(&self, ctx: &mut RequestContext<S>) -> Result<Flow, ApiError>;
}

pub type SharedMiddleware<S> = Arc<dyn Middleware<S>>;
