#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use recipe_api::auth::{TokenRecord, TokenType};
use recipe_api::config::AppConfig;
use recipe_api::database::{DatabaseError, QueryBase, SettingsStore, TokenStore, UserRecord, UserStore};
use recipe_api::query::SqlQuery;
use recipe_api::routes;
use recipe_api::server;
use recipe_api::state::{AppState, Stores};

/// In-process HTTP stack (axum host plus the application router) backed by throwaway
/// stores.
pub struct TestServer {
    pub app: axum::Router,
    pub state: AppState,
}

impl TestServer {
    pub fn start() -> anyhow::Result<Self> {
        let router = routes::build()?;
        let stores = Stores {
            query_base: Arc::new(EmptyQueryBase),
            tokens: Arc::new(Tokens::default()),
            users: Arc::new(OneUser),
            settings: Arc::new(NoSettings),
        };
        let state = AppState::new(AppConfig::development(), stores, router.urls());
        let app = server::app(Arc::new(router), state.clone());
        Ok(Self { app, state })
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = bearer {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let response = self.app.clone().oneshot(request.body(Body::empty())?).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
    }
}

pub struct EmptyQueryBase;

#[async_trait]
impl QueryBase for EmptyQueryBase {
    async fn fetch_rows(&self, _query: &SqlQuery) -> Result<Vec<Value>, DatabaseError> {
        Ok(vec![])
    }

    async fn fetch_count(&self, _query: &SqlQuery) -> Result<i64, DatabaseError> {
        Ok(0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct Tokens(Mutex<Vec<TokenRecord>>);

#[async_trait]
impl TokenStore for Tokens {
    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> Result<(), DatabaseError> {
        let mut records = self.0.lock().unwrap();
        records.push(access.clone());
        records.push(refresh.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<TokenRecord>, DatabaseError> {
        Ok(self.0.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_demo_access(&self, owner_id: i64) -> Result<Option<TokenRecord>, DatabaseError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.demo && r.owner_id == owner_id && r.token_type == TokenType::Access && !r.revoked)
            .cloned())
    }

    async fn revoke_group(&self, group_id: Uuid) -> Result<u64, DatabaseError> {
        let mut revoked = 0;
        for record in self.0.lock().unwrap().iter_mut().filter(|r| r.group_id == group_id) {
            record.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

pub const USER_ID: i64 = 1;

pub struct OneUser;

impl OneUser {
    fn record() -> UserRecord {
        UserRecord {
            id: USER_ID,
            name: "Cook".to_string(),
            email: "cook@example.com".to_string(),
            password_hash: String::new(),
            is_admin: false,
            email_verified_at: None,
        }
    }
}

#[async_trait]
impl UserStore for OneUser {
    async fn find(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError> {
        Ok((id == USER_ID).then(Self::record))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(Some(Self::record()).filter(|u| u.email == email))
    }

    async fn mark_email_verified(&self, id: i64, _at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        Ok(id == USER_ID)
    }
}

pub struct NoSettings;

#[async_trait]
impl SettingsStore for NoSettings {
    async fn all(&self) -> Result<Map<String, Value>, DatabaseError> {
        Ok(Map::new())
    }

    async fn set(&self, _path: &str, _value: &Value) -> Result<(), DatabaseError> {
        Ok(())
    }
}
