use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::auth::{Authenticated, Principal};
use crate::error::ApiError;

use super::pattern::PathParams;

/// What the router needs from an incoming HTTP request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RouteRequest {
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Per-request context handed through every middleware to the handler. Carries the
/// shared application state, the matched path parameters and, once the authorization
/// stage has run, the authenticated principal.
pub struct RequestContext<S> {
    pub state: S,
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub params: PathParams,
    auth: Option<Authenticated>,
}

impl<S> RequestContext<S> {
    pub fn new(state: S, request: RouteRequest, params: PathParams) -> Self {
        Self {
            state,
            method: request.method,
            path: request.path,
            query: request.query,
            headers: request.headers,
            body: request.body,
            params,
            auth: None,
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(ApiError::invalid_json("Request body is required"));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
    }

    pub fn int_param(&self, name: &str) -> Result<i64, ApiError> {
        self.params.int(name).ok_or_else(|| missing_param(name))
    }

    pub fn str_param(&self, name: &str) -> Result<&str, ApiError> {
        self.params.str(name).ok_or_else(|| missing_param(name))
    }

    pub fn set_auth(&mut self, auth: Authenticated) {
        self.auth = Some(auth);
    }

    pub fn auth(&self) -> Option<&Authenticated> {
        self.auth.as_ref()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.auth.as_ref().map(|a| &a.principal)
    }

    pub fn require_auth(&self) -> Result<&Authenticated, ApiError> {
        self.auth
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }

    pub fn require_principal(&self) -> Result<&Principal, ApiError> {
        self.require_auth().map(|a| &a.principal)
    }
}

// A handler asking for a placeholder its pattern lacks is a wiring bug, not a client error.
fn missing_param(name: &str) -> ApiError {
    tracing::error!("Route has no path parameter '{}'", name);
    ApiError::internal_server_error("Internal server error")
}
