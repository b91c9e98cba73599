use crate::application::jobs::create::{CreateJobRequest, CreateJobUseCase, CreatedJob};
use crate::application::jobs::delete::DeleteJobUseCase;
use crate::application::jobs::get::{GetJobUseCase, JobDetailResponse};
use crate::application::jobs::search::{ListJobsQuery, SearchJobsUseCase};
use crate::application::jobs::update::{UpdateJobRequest, UpdateJobUseCase};
use crate::domain::jobs::JobSummary;
use crate::domain::users::CurrentUser;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::jobs::PostgresJobRepository;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::query::Qs;
use crate::shared::response::{ApiResponse, MessageResponse};
use crate::shared::validation::ValidatedJson;
use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

fn repository(session: DbSession) -> Arc<PostgresJobRepository> {
    Arc::new(PostgresJobRepository::new(session))
}

/// Search active postings.
///
/// List filters are passed as indexed arrays, e.g. `tech_stacks[0]=Rust`.
#[utoipa::path(
    get,
    path = "/jobs",
    params(ListJobsQuery),
    responses(
        (status = 200, description = "One page of postings; `meta` echoes page and sort", body = ApiResponse<Vec<JobSummary>>),
        (status = 422, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn list_jobs(
    session: DbSession,
    Qs(query): Qs<ListJobsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let listing = SearchJobsUseCase::new(repository(session))
        .execute(query)
        .await?;

    let meta = serde_json::to_value(&listing.meta)
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(listing.jobs).with_meta(meta)),
    ))
}

/// Posting detail; every call counts as a view
#[utoipa::path(
    get,
    path = "/jobs/{id}",
    params(
        ("id" = i64, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Posting with related postings", body = ApiResponse<JobDetailResponse>),
        (status = 404, description = "Posting not found", body = ErrorResponse)
    ),
    tag = "jobs"
)]
pub async fn get_job(
    session: DbSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = GetJobUseCase::new(repository(session)).execute(id).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(detail))))
}

#[utoipa::path(
    post,
    path = "/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Posting created", body = ApiResponse<CreatedJob>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "jobs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_job(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    ValidatedJson(req): ValidatedJson<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = CreateJobUseCase::new(repository(session))
        .execute(req)
        .await?;

    tracing::info!(user_id = user.id, posting_id = created.posting_id, "job posting created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    params(
        ("id" = i64, Path, description = "Posting ID")
    ),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Posting updated", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Posting not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "jobs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_job(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    UpdateJobUseCase::new(repository(session))
        .execute(id, req)
        .await?;

    tracing::info!(user_id = user.id, posting_id = id, "job posting updated");

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(MessageResponse::new("Job posting updated"))),
    ))
}

/// Soft delete: the posting stays in the database with status `deleted`
#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    params(
        ("id" = i64, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Posting deleted", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Posting already deleted", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Posting not found", body = ErrorResponse)
    ),
    tag = "jobs",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_job(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    DeleteJobUseCase::new(repository(session)).execute(id).await?;

    tracing::info!(user_id = user.id, posting_id = id, "job posting deleted");

    Ok((
        StatusCode::OK,
        Json(ApiResponse::new(MessageResponse::new("Job posting deleted"))),
    ))
}
