use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::routes;
use crate::server;
use crate::state::{AppState, Stores};

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    tracing::info!("Starting Recipe API in {:?} mode", config.environment);
    if config.security.demo_token.is_some() {
        tracing::warn!("Demo credential enabled for user {}", config.security.demo_user_id);
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    let router = routes::build()?;
    let stores = Stores::postgres(pool.clone(), &config);
    let state = AppState::new(config, stores, router.urls());

    if !state.tokens.demo_owner_exists().await? {
        DatabaseManager::close(pool).await;
        anyhow::bail!(
            "SECURITY_DEMO_USER_ID {} does not exist; create that user or unset SECURITY_DEMO_TOKEN",
            state.config.security.demo_user_id
        );
    }

    let result = server::serve(router, state).await;
    DatabaseManager::close(pool).await;
    result
}
