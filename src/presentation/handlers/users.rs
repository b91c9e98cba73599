use crate::application::users::update_profile::{UpdateProfileRequest, UpdateProfileUseCase};
use crate::domain::users::CurrentUser;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{ApiResponse, MessageResponse};
use crate::shared::validation::ValidatedJson;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

/// Update the caller's own profile
#[utoipa::path(
    put,
    path = "/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Nothing to update or wrong current password", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = UpdateProfileUseCase::new(
        Arc::new(PostgresUserRepository::new(session)),
        state.password_service.clone(),
    );

    use_case.execute(&user, req).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(MessageResponse::new("Profile updated"))),
    ))
}
