use axum::http::Method;
use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;

use super::context::RequestContext;
use super::handler::{handler, BoxHandler, IntoReply};
use super::middleware::{Middleware, SharedMiddleware};

/// One route declaration before it is compiled into the route table.
pub struct Endpoint<S> {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) middlewares: Vec<SharedMiddleware<S>>,
    pub(crate) handler: BoxHandler<S>,
    pub(crate) name: Option<String>,
}

impl<S: Send + Sync + 'static> Endpoint<S> {
    pub fn new(method: Method, pattern: impl Into<String>, handler: BoxHandler<S>) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            middlewares: vec![],
            handler,
            name: None,
        }
    }

    pub fn get<F, Fut, R>(pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        Self::new(Method::GET, pattern, handler(f))
    }

    pub fn post<F, Fut, R>(pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        Self::new(Method::POST, pattern, handler(f))
    }

    pub fn put<F, Fut, R>(pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        Self::new(Method::PUT, pattern, handler(f))
    }

    pub fn delete<F, Fut, R>(pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        Self::new(Method::DELETE, pattern, handler(f))
    }

    /// Runs after every scope middleware.
    pub fn with(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Name used for URL generation.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

pub(crate) enum Entry<S> {
    Endpoint(Endpoint<S>),
    Scope(Scope<S>),
}

/// A group of routes sharing a path prefix and leading middlewares. Scopes nest; a
/// route's pipeline is every enclosing scope's middlewares, outermost first, then its own.
pub struct Scope<S> {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<SharedMiddleware<S>>,
    pub(crate) entries: Vec<Entry<S>>,
}

impl<S: Send + Sync + 'static> Scope<S> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            middlewares: vec![],
            entries: vec![],
        }
    }

    pub fn root() -> Self {
        Self::new("")
    }

    pub fn with(mut self, middleware: impl Middleware<S> + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn route(mut self, endpoint: Endpoint<S>) -> Self {
        self.entries.push(Entry::Endpoint(endpoint));
        self
    }

    pub fn scope(mut self, child: Scope<S>) -> Self {
        self.entries.push(Entry::Scope(child));
        self
    }

    pub fn register(
        &mut self,
        method: Method,
        pattern: impl Into<String>,
        middlewares: Vec<SharedMiddleware<S>>,
        handler: BoxHandler<S>,
    ) -> &mut Self {
        let mut endpoint = Endpoint::new(method, pattern, handler);
        endpoint.middlewares = middlewares;
        self.entries.push(Entry::Endpoint(endpoint));
        self
    }

    pub fn get<F, Fut, R>(self, pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        self.route(Endpoint::get(pattern, f))
    }

    pub fn post<F, Fut, R>(self, pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        self.route(Endpoint::post(pattern, f))
    }

    pub fn put<F, Fut, R>(self, pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        self.route(Endpoint::put(pattern, f))
    }

    pub fn delete<F, Fut, R>(self, pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn(RequestContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
        R: IntoReply,
    {
        self.route(Endpoint::delete(pattern, f))
    }
}
