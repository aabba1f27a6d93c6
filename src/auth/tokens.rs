use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::{DatabaseError, TokenStore, UserStore};

use super::{Authenticated, Claims, Principal, TokenRecord, TokenType};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Bearer credentials handed to a client after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires
    pub expires_in: i64,
    #[serde(skip)]
    pub group_id: Uuid,
}

/// Issues, resolves and revokes token pairs. Every resolution reads the store, so a
/// revocation is visible to the very next request.
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    users: Arc<dyn UserStore>,
    config: SecurityConfig,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>, users: Arc<dyn UserStore>, config: SecurityConfig) -> Self {
        Self { store, users, config }
    }

    pub async fn issue_pair(&self, owner_id: i64) -> Result<IssuedPair, TokenError> {
        let (pair, _) = self.issue(owner_id, false).await?;
        tracing::info!("Issued token group {} for user {}", pair.group_id, owner_id);
        Ok(pair)
    }

    async fn issue(&self, owner_id: i64, demo: bool) -> Result<(IssuedPair, TokenRecord), TokenError> {
        let now = Utc::now();
        let group_id = Uuid::new_v4();
        let access = TokenRecord {
            id: Uuid::new_v4(),
            group_id,
            token_type: TokenType::Access,
            owner_id,
            expires_at: now + Duration::minutes(self.config.access_token_ttl_minutes),
            revoked: false,
            demo,
        };
        let refresh = TokenRecord {
            id: Uuid::new_v4(),
            token_type: TokenType::Refresh,
            expires_at: now + Duration::days(self.config.refresh_token_ttl_days),
            ..access.clone()
        };

        let access_token = self.encode(&Claims::for_record(&access, now))?;
        let refresh_token = self.encode(&Claims::for_record(&refresh, now))?;
        self.store.insert_pair(&access, &refresh).await?;

        let pair = IssuedPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: (access.expires_at - now).num_seconds(),
            group_id,
        };
        Ok((pair, access))
    }

    pub fn is_demo_credential(&self, credential: &str) -> bool {
        matches!(&self.config.demo_token, Some(demo) if demo == credential)
    }

    /// Resolve a bearer credential. `Ok(None)` means the credential is not valid;
    /// `Err` is reserved for store failures.
    pub async fn resolve(&self, credential: &str) -> Result<Option<Authenticated>, TokenError> {
        if self.is_demo_credential(credential) {
            return self.demo_session().await.map(Some);
        }

        let Some(claims) = self.decode(credential) else {
            return Ok(None);
        };
        self.lookup(&claims, TokenType::Access, Utc::now()).await
    }

    /// The demo principal, backed by a lazily created token pair. Expiry is not checked.
    pub async fn demo_session(&self) -> Result<Authenticated, TokenError> {
        let owner_id = self.config.demo_user_id;
        let record = match self.store.find_demo_access(owner_id).await? {
            Some(record) => record,
            None => {
                tracing::info!("Creating demo token pair for user {}", owner_id);
                self.issue(owner_id, true).await?.1
            }
        };

        Ok(Authenticated {
            principal: Principal::demo(owner_id),
            token_id: record.id,
            group_id: record.group_id,
        })
    }

    /// Whether the configured demo credential has a user behind it. Always true when
    /// demo access is disabled.
    pub async fn demo_owner_exists(&self) -> Result<bool, TokenError> {
        if self.config.demo_token.is_none() {
            return Ok(true);
        }
        Ok(self.users.find(self.config.demo_user_id).await?.is_some())
    }

    /// Exchange a refresh token for a new pair; the old group is revoked first. Only the
    /// request whose revocation touched the group may mint the replacement.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<IssuedPair>, TokenError> {
        let Some(claims) = self.decode(refresh_token) else {
            return Ok(None);
        };
        let Some(session) = self.lookup(&claims, TokenType::Refresh, Utc::now()).await? else {
            return Ok(None);
        };

        if self.store.revoke_group(session.group_id).await? == 0 {
            tracing::warn!("Refresh token {} was already redeemed", claims.jti);
            return Ok(None);
        }
        self.issue_pair(session.principal.id).await.map(Some)
    }

    pub async fn revoke(&self, group_id: Uuid) -> Result<u64, TokenError> {
        let revoked = self.store.revoke_group(group_id).await?;
        tracing::info!("Revoked {} token(s) in group {}", revoked, group_id);
        Ok(revoked)
    }

    async fn lookup(
        &self,
        claims: &Claims,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Option<Authenticated>, TokenError> {
        if claims.typ != expected {
            tracing::warn!("Rejected {} token where {} was expected", claims.typ.as_str(), expected.as_str());
            return Ok(None);
        }

        let Some(record) = self.store.find(claims.jti).await? else {
            tracing::warn!("Rejected unknown token {}", claims.jti);
            return Ok(None);
        };
        if record.token_type != expected || record.group_id != claims.grp || record.owner_id != claims.sub {
            tracing::warn!("Rejected token {}: claims do not match stored record", claims.jti);
            return Ok(None);
        }
        if !record.is_usable(now) {
            tracing::debug!("Rejected token {}: revoked or expired", claims.jti);
            return Ok(None);
        }

        let Some(user) = self.users.find(record.owner_id).await? else {
            tracing::warn!("Rejected token {}: owner {} no longer exists", claims.jti, record.owner_id);
            return Ok(None);
        };

        Ok(Some(Authenticated {
            principal: Principal::from(&user),
            token_id: record.id,
            group_id: record.group_id,
        }))
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let secret = &self.config.jwt_secret;
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::default(), claims, &encoding_key)?)
    }

    /// Signature and `exp` check only; the store has the final say.
    fn decode(&self, token: &str) -> Option<Claims> {
        let secret = &self.config.jwt_secret;
        if secret.is_empty() {
            return None;
        }
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        match decode::<Claims>(token, &decoding_key, &Validation::default()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Invalid JWT token: {}", e);
                None
            }
        }
    }
}
