use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Which endpoint family a token is good for
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

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl Claims {
    pub fn new(subject: impl Into<String>, token_type: TokenType, lifetime: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: subject.into(),
            iat: now,
            exp: now + lifetime.whole_seconds(),
            token_type,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("expected {expected} token, got {found}")]
    /// `found` is the raw claim, which may name no known type at all
    TypeMismatch { expected: TokenType, found: String },
    #[error("token is malformed or its signature does not verify")]
    Malformed,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and checks signed bearer tokens
pub trait TokenService: Send + Sync {
    fn issue_access_token(&self, subject: &str) -> Result<String, TokenError>;

    fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError>;

    /// Verify signature, expiry and type; return the subject
    fn validate(&self, token: &str, expected: TokenType) -> Result<String, TokenError>;

    fn access_token_lifetime(&self) -> Duration;
}
