use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{TokenService, UrlSigner};
use crate::config::AppConfig;
use crate::database::{
    PgQueryBase, PgSettingsStore, PgTokenStore, PgUserStore, QueryBase, SettingsStore, TokenStore,
    UserStore,
};
use crate::router::RouteUrls;

/// Backing stores, abstracted so the server can run against Postgres or in-memory fakes.
pub struct Stores {
    pub query_base: Arc<dyn QueryBase>,
    pub tokens: Arc<dyn TokenStore>,
    pub users: Arc<dyn UserStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            query_base: Arc::new(PgQueryBase::new(pool.clone(), &config.database)),
            tokens: Arc::new(PgTokenStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            settings: Arc::new(PgSettingsStore::new(pool)),
        }
    }
}

/// Shared state handed to every request context. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub query_base: Arc<dyn QueryBase>,
    pub users: Arc<dyn UserStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub tokens: Arc<TokenService>,
    pub signer: Arc<UrlSigner>,
    pub urls: Arc<RouteUrls>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores, urls: Arc<RouteUrls>) -> Self {
        let tokens = TokenService::new(stores.tokens, stores.users.clone(), config.security.clone());
        let signer = UrlSigner::new(&config.security.link_signing_key);

        Self {
            config: Arc::new(config),
            query_base: stores.query_base,
            users: stores.users,
            settings: stores.settings,
            tokens: Arc::new(tokens),
            signer: Arc::new(signer),
            urls,
        }
    }
}
