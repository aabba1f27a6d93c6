pub mod password;
pub mod signing;
pub mod tokens;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::database::UserRecord;

pub use signing::{SignatureError, UrlSigner};
pub use tokens::{IssuedPair, TokenError, TokenService};

/// The caller a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub admin: bool,
    pub email_verified: bool,
    pub demo: bool,
}

impl Principal {
    /// Fixed identity behind the demo credential.
    pub fn demo(id: i64) -> Self {
        Self {
            id,
            admin: false,
            email_verified: true,
            demo: true,
        }
    }
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            admin: user.is_admin,
            email_verified: user.email_verified_at.is_some(),
            demo: false,
        }
    }
}

/// A principal together with the token group that authenticated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub principal: Principal,
    pub token_id: Uuid,
    pub group_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl FromStr for TokenType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            _ => Err(()),
        }
    }
}

/// Stored state of one issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub id: Uuid,
    pub group_id: Uuid,
    pub token_type: TokenType,
    pub owner_id: i64,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub demo: bool,
}

impl TokenRecord {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// JWT claims carried by both halves of a token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub jti: Uuid,
    pub grp: Uuid,
    pub typ: TokenType,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_record(record: &TokenRecord, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: record.owner_id,
            jti: record.id,
            grp: record.group_id,
            typ: record.token_type,
            exp: record.expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}
