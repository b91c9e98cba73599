//! Request authentication: bearer header -> access token -> active user.
//!
//! Every way of failing is kept distinct in [`AuthFailure`] so it can be
//! logged precisely, while callers only ever learn "not authenticated".

use crate::domain::auth::{TokenError, TokenService, TokenType};
use crate::domain::users::{CurrentUser, UserRepository, UserStatus};
use crate::shared::error::AppError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("missing bearer credentials: {0}")]
    MissingCredentials(&'static str),
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),
    #[error("no account for token subject {0:?}")]
    UserNotFound(String),
    #[error("account {id} is {status}")]
    UserInactiveOrBlocked { id: i64, status: UserStatus },
    #[error("user lookup failed: {0}")]
    Lookup(anyhow::Error),
}

impl AuthFailure {
    fn log(&self) {
        match self {
            AuthFailure::MissingCredentials(_) => tracing::debug!(cause = %self, "unauthenticated"),
            AuthFailure::Lookup(_) => tracing::error!(cause = %self, "unauthenticated"),
            _ => tracing::warn!(cause = %self, "unauthenticated"),
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(_: AuthFailure) -> Self {
        AppError::Unauthorized("Authentication required".to_string())
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthFailure> {
    let header = header.ok_or(AuthFailure::MissingCredentials("no Authorization header"))?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthFailure::MissingCredentials("malformed Authorization header"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthFailure::MissingCredentials("not a bearer scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthFailure::MissingCredentials("empty bearer token"));
    }

    Ok(token)
}

#[derive(Clone)]
pub struct AuthenticationGate {
    token_service: Arc<dyn TokenService>,
}

impl AuthenticationGate {
    pub fn new(token_service: Arc<dyn TokenService>) -> Self {
        Self { token_service }
    }

    /// Check the header and the access token; returns the subject's user id.
    /// No database work happens here.
    pub fn verify(&self, authorization: Option<&str>) -> Result<i64, AuthFailure> {
        self.verify_token(authorization).inspect_err(AuthFailure::log)
    }

    fn verify_token(&self, authorization: Option<&str>) -> Result<i64, AuthFailure> {
        let token = bearer_token(authorization)?;
        let subject = self.token_service.validate(token, TokenType::Access)?;
        subject
            .parse::<i64>()
            .map_err(|_| AuthFailure::UserNotFound(subject))
    }

    /// Load the user behind a verified subject and require an active account
    pub async fn resolve(
        &self,
        user_id: i64,
        users: &dyn UserRepository,
    ) -> Result<CurrentUser, AuthFailure> {
        load_active_user(user_id, users)
            .await
            .inspect_err(AuthFailure::log)
    }

    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        users: &dyn UserRepository,
    ) -> Result<CurrentUser, AuthFailure> {
        let user_id = self.verify(authorization)?;
        self.resolve(user_id, users).await
    }
}

/// Shared by the gate and the refresh flow
pub async fn load_active_user(
    user_id: i64,
    users: &dyn UserRepository,
) -> Result<CurrentUser, AuthFailure> {
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(AuthFailure::Lookup)?
        .ok_or_else(|| AuthFailure::UserNotFound(user_id.to_string()))?;

    if !user.status.is_active() {
        return Err(AuthFailure::UserInactiveOrBlocked {
            id: user.id,
            status: user.status,
        });
    }

    Ok(CurrentUser::from(user))
}
