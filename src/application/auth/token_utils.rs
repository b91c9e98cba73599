use crate::domain::auth::{TokenError, TokenService};
use crate::shared::error::AppError;
use serde::Serialize;

/// Token pair handed out by register, login and refresh
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

fn signing_failure(err: TokenError) -> AppError {
    AppError::InternalServerError(anyhow::Error::new(err))
}

/// Issue a fresh access/refresh pair for `user_id`
pub fn issue_token_pair(
    user_id: i64,
    token_service: &dyn TokenService,
) -> Result<TokenResponse, AppError> {
    let subject = user_id.to_string();

    let access_token = token_service
        .issue_access_token(&subject)
        .map_err(signing_failure)?;
    let refresh_token = token_service
        .issue_refresh_token(&subject)
        .map_err(signing_failure)?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        expires_in: token_service.access_token_lifetime().whole_seconds(),
    })
}
