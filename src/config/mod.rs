use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub query: QueryConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_per_page: u64,
    pub max_per_page: Option<u64>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_slow_query_warning: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// Bearer value that resolves to the demo principal; `None` disables demo access.
    pub demo_token: Option<String>,
    pub demo_user_id: i64,
    pub link_signing_key: String,
    pub signed_link_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    /// Apply per-key overrides; values that fail to parse keep the preset.
    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Query overrides
        if let Some(v) = var("QUERY_DEFAULT_PER_PAGE") {
            self.query.default_per_page = v.parse().unwrap_or(self.query.default_per_page);
        }
        if let Some(v) = var("QUERY_MAX_PER_PAGE") {
            self.query.max_per_page = v.parse().ok().or(self.query.max_per_page);
        }
        if let Some(v) = var("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = var("DATABASE_ENABLE_SLOW_QUERY_WARNING") {
            self.database.enable_slow_query_warning =
                v.parse().unwrap_or(self.database.enable_slow_query_warning);
        }
        if let Some(v) = var("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms =
                v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // API overrides
        if let Some(v) = var("API_PORT").or_else(|| var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("SECURITY_ACCESS_TOKEN_TTL_MINUTES") {
            self.security.access_token_ttl_minutes =
                v.parse().unwrap_or(self.security.access_token_ttl_minutes);
        }
        if let Some(v) = var("SECURITY_REFRESH_TOKEN_TTL_DAYS") {
            self.security.refresh_token_ttl_days =
                v.parse().unwrap_or(self.security.refresh_token_ttl_days);
        }
        if let Some(v) = var("SECURITY_DEMO_TOKEN") {
            self.security.demo_token = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Some(v) = var("SECURITY_DEMO_USER_ID") {
            self.security.demo_user_id = v.parse().unwrap_or(self.security.demo_user_id);
        }
        if let Some(v) = var("SECURITY_LINK_SIGNING_KEY") {
            self.security.link_signing_key = v;
        }
        if let Some(v) = var("SECURITY_SIGNED_LINK_TTL_MINUTES") {
            self.security.signed_link_ttl_minutes =
                v.parse().unwrap_or(self.security.signed_link_ttl_minutes);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins =
                v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            query: QueryConfig {
                default_per_page: 15,
                max_per_page: Some(100),
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 100,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "development-jwt-secret-change-me".to_string(),
                access_token_ttl_minutes: 60,
                refresh_token_ttl_days: 30,
                demo_token: Some("demo".to_string()),
                demo_user_id: 1,
                link_signing_key: "development-link-key-change-me".to_string(),
                signed_link_ttl_minutes: 60,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            query: QueryConfig {
                default_per_page: 15,
                max_per_page: Some(100),
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 500,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_ttl_minutes: 30,
                refresh_token_ttl_days: 14,
                demo_token: Some("demo".to_string()),
                demo_user_id: 1,
                link_signing_key: String::new(),
                signed_link_ttl_minutes: 60,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            query: QueryConfig {
                default_per_page: 15,
                max_per_page: Some(50),
                debug_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 1000,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
                demo_token: None,
                demo_user_id: 1,
                link_signing_key: String::new(),
                signed_link_ttl_minutes: 30,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Secrets left empty by the staging/production presets must come from the environment.
    pub fn validate(&self) -> Result<(), String> {
        if self.security.jwt_secret.is_empty() {
            return Err("SECURITY_JWT_SECRET is not configured".to_string());
        }
        if self.security.link_signing_key.is_empty() {
            return Err("SECURITY_LINK_SIGNING_KEY is not configured".to_string());
        }
        if self.query.default_per_page == 0 {
            return Err("QUERY_DEFAULT_PER_PAGE must be at least 1".to_string());
        }
        Ok(())
    }
}
