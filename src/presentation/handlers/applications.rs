use crate::application::applications::apply::{ApplyRequest, ApplyUseCase, SubmittedApplication};
use crate::application::applications::cancel::CancelApplicationUseCase;
use crate::application::applications::list::{ListApplicationsQuery, ListApplicationsUseCase};
use crate::domain::applications::ApplicationSummary;
use crate::domain::users::CurrentUser;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::applications::PostgresApplicationRepository;
use crate::infrastructure::repositories::jobs::PostgresJobRepository;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::pagination::PAGE_SIZE;
use crate::shared::query::Qs;
use crate::shared::response::{ApiResponse, MessageResponse};
use crate::shared::validation::ValidatedJson;
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/users/applications",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<SubmittedApplication>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Resume belongs to someone else", body = ErrorResponse),
        (status = 404, description = "Posting not found", body = ErrorResponse),
        (status = 409, description = "Already applied", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "applications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn apply(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    ValidatedJson(req): ValidatedJson<ApplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = ApplyUseCase::new(
        Arc::new(PostgresApplicationRepository::new(session.clone())),
        Arc::new(PostgresJobRepository::new(session)),
    );

    let submitted = use_case.execute(&user, req).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(submitted))))
}

/// The caller's applications with posting title and company
#[utoipa::path(
    get,
    path = "/users/applications",
    params(ListApplicationsQuery),
    responses(
        (status = 200, description = "One page of applications", body = ApiResponse<Vec<ApplicationSummary>>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    tag = "applications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_applications(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    Qs(query): Qs<ListApplicationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let use_case =
        ListApplicationsUseCase::new(Arc::new(PostgresApplicationRepository::new(session)));

    let (applications, page) = use_case.execute(&user, query).await?;

    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::new(applications)
                .with_meta(json!({ "page": page.number(), "page_size": PAGE_SIZE })),
        ),
    ))
}

#[utoipa::path(
    delete,
    path = "/users/applications/{id}",
    params(
        ("id" = i64, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application cancelled", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Not your application", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    tag = "applications",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cancel_application(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let use_case =
        CancelApplicationUseCase::new(Arc::new(PostgresApplicationRepository::new(session)));

    use_case.execute(&user, id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(MessageResponse::new(
            "Application cancelled",
        ))),
    ))
}
