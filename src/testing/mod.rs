//! In-memory stores and a recording query base, so the whole request path can be
//! exercised without Postgres.

mod scenarios;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderValue, Method, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::{TokenRecord, TokenType};
use crate::config::AppConfig;
use crate::database::{DatabaseError, QueryBase, SettingsStore, TokenStore, UserRecord, UserStore};
use crate::query::SqlQuery;
use crate::router::{RouteRequest, Router};
use crate::routes;
use crate::state::{AppState, Stores};

#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<Vec<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn records(&self) -> Vec<TokenRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Push every token of the group into the past.
    pub fn expire_group(&self, group_id: Uuid) {
        for record in self.records.lock().unwrap().iter_mut() {
            if record.group_id == group_id {
                record.expires_at = Utc::now() - Duration::minutes(1);
            }
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> Result<(), DatabaseError> {
        let mut records = self.records.lock().unwrap();
        records.push(access.clone());
        records.push(refresh.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<TokenRecord>, DatabaseError> {
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_demo_access(&self, owner_id: i64) -> Result<Option<TokenRecord>, DatabaseError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.demo && r.owner_id == owner_id && r.token_type == TokenType::Access && !r.revoked)
            .cloned())
    }

    async fn revoke_group(&self, group_id: Uuid) -> Result<u64, DatabaseError> {
        let mut revoked = 0;
        for record in self.records.lock().unwrap().iter_mut() {
            if record.group_id == group_id && !record.revoked {
                record.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRecord>>,
    updates_lost: AtomicBool,
}

impl MemoryUserStore {
    pub const MEMBER_ID: i64 = 1;
    pub const ADMIN_ID: i64 = 2;
    pub const MEMBER_EMAIL: &'static str = "cook@example.com";
    pub const ADMIN_EMAIL: &'static str = "admin@example.com";

    /// A member and an administrator. Neither can log in until given a password.
    pub fn seeded() -> Self {
        let store = Self::default();
        store.insert(user(Self::MEMBER_ID, "Cook", Self::MEMBER_EMAIL, false));
        store.insert(user(Self::ADMIN_ID, "Admin", Self::ADMIN_EMAIL, true));
        store
    }

    pub fn insert(&self, record: UserRecord) {
        self.users.lock().unwrap().push(record);
    }

    pub fn set_password(&self, id: i64, password: &str) {
        let hash = hash_password(password).unwrap();
        for user in self.users.lock().unwrap().iter_mut() {
            if user.id == id {
                user.password_hash = hash.clone();
            }
        }
    }

    /// Later updates report no row touched, as if the user was deleted mid-request.
    pub fn lose_updates(&self) {
        self.updates_lost.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: i64) -> Option<UserRecord> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

fn user(id: i64, name: &str, email: &str, is_admin: bool) -> UserRecord {
    UserRecord {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "unset".to_string(),
        is_admin,
        email_verified_at: None,
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, id: i64) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn mark_email_verified(&self, id: i64, at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        if self.updates_lost.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.email_verified_at.get_or_insert(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<Map<String, Value>>,
}

impl MemorySettingsStore {
    pub fn all_paths(&self) -> Vec<String> {
        self.values.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn all(&self) -> Result<Map<String, Value>, DatabaseError> {
        Ok(self.values.lock().unwrap().clone())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), DatabaseError> {
        self.values.lock().unwrap().insert(path.to_string(), value.clone());
        Ok(())
    }
}

/// Answers every count with `count` and every select with `rows`, remembering the SQL.
#[derive(Default)]
pub struct RecordingQueryBase {
    pub count: i64,
    pub rows: Vec<Value>,
    pub unavailable: bool,
    queries: Mutex<Vec<SqlQuery>>,
}

impl RecordingQueryBase {
    pub fn new(count: i64, rows: Vec<Value>) -> Self {
        Self {
            count,
            rows,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<SqlQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn selects(&self) -> Vec<SqlQuery> {
        self.queries()
            .into_iter()
            .filter(|q| !q.query.starts_with("SELECT COUNT(*)"))
            .collect()
    }
}

#[async_trait]
impl QueryBase for RecordingQueryBase {
    async fn fetch_rows(&self, query: &SqlQuery) -> Result<Vec<Value>, DatabaseError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.rows.clone())
    }

    async fn fetch_count(&self, query: &SqlQuery) -> Result<i64, DatabaseError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.count)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.unavailable {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(())
    }
}

/// The real route table wired to in-memory stores.
pub struct TestApp {
    pub router: Router<AppState>,
    pub state: AppState,
    pub tokens: Arc<MemoryTokenStore>,
    pub users: Arc<MemoryUserStore>,
    pub settings: Arc<MemorySettingsStore>,
    pub queries: Arc<RecordingQueryBase>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_query_base(RecordingQueryBase::default())
    }

    pub fn with_query_base(query_base: RecordingQueryBase) -> Self {
        let tokens = Arc::new(MemoryTokenStore::default());
        let users = Arc::new(MemoryUserStore::seeded());
        let settings = Arc::new(MemorySettingsStore::default());
        let queries = Arc::new(query_base);

        let router = routes::build().unwrap();
        let stores = Stores {
            query_base: queries.clone(),
            tokens: tokens.clone(),
            users: users.clone(),
            settings: settings.clone(),
        };
        let state = AppState::new(AppConfig::development(), stores, router.urls());

        Self {
            router,
            state,
            tokens,
            users,
            settings,
            queries,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = RouteRequest::new(method, uri);
        if let Some(token) = bearer {
            let header = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
            request.headers.insert("authorization", header);
        }
        if let Some(body) = body {
            request.body = Bytes::from(serde_json::to_vec(&body).unwrap());
        }

        let response = self.router.dispatch(self.state.clone(), request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, bearer, None).await
    }

    /// Access token for a seeded user.
    pub async fn access_token(&self, owner_id: i64) -> String {
        self.state.tokens.issue_pair(owner_id).await.unwrap().access_token
    }
}
