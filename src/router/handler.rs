use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;
use crate::query::Page;

use super::context::RequestContext;

/// Normalized handler output.
pub enum Reply {
    /// Rendered as a 200 JSON body
    Data(Value),
    /// Passed through unchanged
    Response(Response),
    /// 204 with no body
    Empty,
}

impl Reply {
    pub fn json<T: Serialize>(value: &T) -> Reply {
        match serde_json::to_value(value) {
            Ok(value) => Reply::Data(value),
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                Reply::Response(ApiError::internal_server_error("Internal server error").into_response())
            }
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Reply::Data(value) => (StatusCode::OK, Json(value)).into_response(),
            Reply::Response(response) => response,
            Reply::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

pub trait IntoReply {
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Reply {
        Reply::Empty
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Reply {
        Reply::Data(self)
    }
}

impl IntoReply for Response {
    fn into_reply(self) -> Reply {
        Reply::Response(self)
    }
}

impl<T: Serialize> IntoReply for Page<T> {
    fn into_reply(self) -> Reply {
        Reply::json(&self)
    }
}

pub type HandlerResult = Result<Reply, ApiError>;

pub type BoxHandler<S> = Arc<dyn Fn(RequestContext<S>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Erase an async handler function into the form stored on a route.
pub fn handler<S, F, Fut, R>(f: F) -> BoxHandler<S>
where
    F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoReply,
{
    Arc::new(move |ctx| {
        let fut = f(ctx);
        Box::pin(async move { fut.await.map(IntoReply::into_reply) })
    })
}
