use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::router::{RouteRequest, Router};
use crate::state::AppState;

#[derive(Clone)]
struct Host {
    router: Arc<Router<AppState>>,
    state: AppState,
}

/// HTTP front door: every request falls through to the application router.
pub fn app(router: Arc<Router<AppState>>, state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config);

    axum::Router::new()
        .fallback(forward)
        .with_state(Host { router, state })
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

async fn forward(State(host): State<Host>, request: Request) -> Response {
    let limit = host.state.config.api.max_request_size_bytes;
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, limit).await {
        Ok(body) => body,
        Err(e) => return body_error(e, limit).into_response(),
    };

    let request = RouteRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers,
        body,
    };
    host.router.dispatch(host.state, request).await
}

fn body_error(err: axum::Error, limit: usize) -> ApiError {
    let inner = err.into_inner();
    if inner.downcast_ref::<LengthLimitError>().is_some() {
        tracing::warn!("Rejected request body over {} bytes", limit);
        return ApiError::payload_too_large(format!("Request body exceeds {} bytes", limit));
    }
    tracing::warn!("Unreadable request body: {}", inner);
    ApiError::bad_request("Request body could not be read")
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// Bind and serve until the process is stopped.
pub async fn serve(router: Router<AppState>, state: AppState) -> anyhow::Result<()> {
    if router.is_empty() {
        anyhow::bail!("refusing to serve an empty route table");
    }
    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Recipe API listening on http://{} ({} routes)", bind_addr, router.len());
    axum::serve(listener, app(Arc::new(router), state)).await?;
    Ok(())
}
