use crate::application::auth::login::{LoginRequest, LoginUseCase};
use crate::application::auth::refresh::{RefreshTokenRequest, RefreshTokenUseCase};
use crate::application::auth::register::{RegisterRequest, RegisterUseCase};
use crate::application::auth::token_utils::TokenResponse;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::ApiResponse;
use crate::shared::validation::{ValidatedJson, ValidatedPayload};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

// Public auth handlers take their connection only once the body is parsed,
// so a slow upload does not pin a pool slot.

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<TokenResponse>),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = DbSession::acquire(&state.pool).await?;
    let use_case = RegisterUseCase::new(
        Arc::new(PostgresUserRepository::new(session)),
        state.token_service.clone(),
        state.password_service.clone(),
    );

    let tokens = use_case.execute(req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(tokens))))
}

/// Exchange credentials for a token pair.
///
/// Accepts JSON or a urlencoded form with `username`/`password`.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(
        content = LoginRequest,
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedPayload(req): ValidatedPayload<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = DbSession::acquire(&state.pool).await?;
    let use_case = LoginUseCase::new(
        Arc::new(PostgresUserRepository::new(session)),
        state.token_service.clone(),
        state.password_service.clone(),
    );

    let tokens = use_case.execute(req).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(tokens))))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = DbSession::acquire(&state.pool).await?;
    let use_case = RefreshTokenUseCase::new(
        Arc::new(PostgresUserRepository::new(session)),
        state.token_service.clone(),
    );

    let tokens = use_case.execute(req).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(tokens))))
}
