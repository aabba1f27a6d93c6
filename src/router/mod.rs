pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod pattern;
pub mod scope;
pub mod urls;

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::ApiError;

pub use context::{RequestContext, RouteRequest};
pub use error::RouteError;
pub use handler::{handler, BoxHandler, HandlerResult, IntoReply, Reply};
pub use middleware::{Flow, Middleware, SharedMiddleware};
pub use pattern::{ParamValue, PathParams, Pattern};
pub use scope::{Endpoint, Scope};
pub use urls::RouteUrls;

use scope::Entry;

/// A compiled route: immutable once the router is built.
pub struct Route<S> {
    method: Method,
    pattern: Pattern,
    middlewares: Vec<SharedMiddleware<S>>,
    handler: BoxHandler<S>,
    name: Option<String>,
}

impl<S> Route<S> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Route listing entry for documentation tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: String,
    pub pattern: String,
    pub name: Option<String>,
    pub middlewares: Vec<String>,
}

/// Ordered route table. Matching walks routes in declaration order and the first
/// method + pattern match wins.
pub struct Router<S> {
    routes: Vec<Route<S>>,
    urls: Arc<RouteUrls>,
}

impl<S: Send + Sync + 'static> Router<S> {
    /// Flatten a scope tree into the route table.
    pub fn build(root: Scope<S>) -> Result<Self, RouteError> {
        let mut routes = Vec::new();
        flatten(root, "", &[], &mut routes)?;

        let mut urls = RouteUrls::default();
        for route in &routes {
            if let Some(name) = &route.name {
                urls.insert(name, route.pattern.clone())?;
            }
        }

        tracing::debug!("Built router with {} routes", routes.len());
        Ok(Self {
            routes,
            urls: Arc::new(urls),
        })
    }

    pub fn urls(&self) -> Arc<RouteUrls> {
        self.urls.clone()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route<S>, PathParams)> {
        self.routes
            .iter()
            .filter(|route| &route.method == method)
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|route| RouteInfo {
                method: route.method.to_string(),
                pattern: route.pattern.as_str().to_string(),
                name: route.name.clone(),
                middlewares: route.middlewares.iter().map(|m| m.name()).collect(),
            })
            .collect()
    }

    /// Match, run the pipeline and normalize the result. Always produces a response.
    pub async fn dispatch(&self, state: S, request: RouteRequest) -> Response {
        let Some((route, params)) = self.find(&request.method, &request.path) else {
            tracing::debug!("No route for {} {}", request.method, request.path);
            return ApiError::not_found("Route not found").into_response();
        };
        tracing::debug!("{} {} matched {}", request.method, request.path, route.pattern.as_str());

        let method = request.method.clone();
        let path = request.path.clone();
        let ctx = RequestContext::new(state, request, params);

        match AssertUnwindSafe(run(route, ctx)).catch_unwind().await {
            Ok(response) => response,
            Err(panic) => {
                tracing::error!("Panic while handling {} {}: {}", method, path, panic_message(&*panic));
                ApiError::internal_server_error("Internal server error").into_response()
            }
        }
    }
}

async fn run<S: Send + Sync + 'static>(route: &Route<S>, mut ctx: RequestContext<S>) -> Response {
    for middleware in &route.middlewares {
        match middleware.handle(&mut ctx).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Respond(response)) => return response,
            Err(err) => return err.into_response(),
        }
    }

    match (route.handler)(ctx).await {
        Ok(reply) => reply.into_response(),
        Err(err) => err.into_response(),
    }
}

fn flatten<S: Send + Sync + 'static>(
    scope: Scope<S>,
    prefix: &str,
    inherited: &[SharedMiddleware<S>],
    out: &mut Vec<Route<S>>,
) -> Result<(), RouteError> {
    let prefix = join(prefix, &scope.prefix);
    let mut middlewares = inherited.to_vec();
    middlewares.extend(scope.middlewares);

    for entry in scope.entries {
        match entry {
            Entry::Endpoint(endpoint) => {
                let pattern = Pattern::parse(&join(&prefix, &endpoint.pattern))?;
                let mut pipeline = middlewares.clone();
                pipeline.extend(endpoint.middlewares);
                out.push(Route {
                    method: endpoint.method,
                    pattern,
                    middlewares: pipeline,
                    handler: endpoint.handler,
                    name: endpoint.name,
                });
            }
            Entry::Scope(child) => flatten(child, &prefix, &middlewares, out)?,
        }
    }
    Ok(())
}

fn join(prefix: &str, path: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
