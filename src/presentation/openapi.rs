use crate::application::applications::apply::{ApplyRequest, SubmittedApplication};
use crate::application::auth::login::LoginRequest;
use crate::application::auth::refresh::RefreshTokenRequest;
use crate::application::auth::register::RegisterRequest;
use crate::application::auth::token_utils::TokenResponse;
use crate::application::bookmarks::toggle::{BookmarkToggled, ToggleBookmarkRequest};
use crate::application::jobs::create::{CreateJobRequest, CreatedJob};
use crate::application::jobs::get::JobDetailResponse;
use crate::application::jobs::search::JobListMeta;
use crate::application::jobs::update::UpdateJobRequest;
use crate::application::users::update_profile::UpdateProfileRequest;
use crate::domain::applications::ApplicationSummary;
use crate::domain::bookmarks::BookmarkedJob;
use crate::domain::jobs::{JobDetail, JobSortField, JobStatus, JobSummary, Location, RelatedJob};
use crate::infrastructure::pool::PoolStatus;
use crate::presentation::handlers::health::HealthReport;
use crate::shared::error::{ErrorDetail, ErrorResponse};
use crate::shared::response::{ApiResponse, MessageResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Job Board API",
        version = "0.1.0",
        description = "Job postings, applications and bookmarks over Axum and SQLx.\n\nSuccessful responses are wrapped as `{\"data\": ..., \"meta\": ...}`; errors as `{\"errors\": [...]}`."
    ),
    paths(
        crate::presentation::handlers::health::health_check,
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::jobs::list_jobs,
        crate::presentation::handlers::jobs::get_job,
        crate::presentation::handlers::jobs::create_job,
        crate::presentation::handlers::jobs::update_job,
        crate::presentation::handlers::jobs::delete_job,
        crate::presentation::handlers::users::update_profile,
        crate::presentation::handlers::applications::apply,
        crate::presentation::handlers::applications::list_applications,
        crate::presentation::handlers::applications::cancel_application,
        crate::presentation::handlers::bookmarks::toggle_bookmark,
        crate::presentation::handlers::bookmarks::list_bookmarks,
    ),
    components(
        schemas(
            // Requests
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            CreateJobRequest,
            UpdateJobRequest,
            Location,
            UpdateProfileRequest,
            ApplyRequest,
            ToggleBookmarkRequest,

            // Resources
            TokenResponse,
            JobSummary,
            JobDetail,
            JobStatus,
            RelatedJob,
            JobDetailResponse,
            JobListMeta,
            JobSortField,
            CreatedJob,
            ApplicationSummary,
            SubmittedApplication,
            BookmarkedJob,
            BookmarkToggled,
            MessageResponse,
            HealthReport,
            PoolStatus,

            // Envelopes
            ApiResponse<TokenResponse>,
            ApiResponse<Vec<JobSummary>>,
            ApiResponse<JobDetailResponse>,
            ApiResponse<CreatedJob>,
            ApiResponse<Vec<ApplicationSummary>>,
            ApiResponse<SubmittedApplication>,
            ApiResponse<Vec<BookmarkedJob>>,
            ApiResponse<BookmarkToggled>,
            ApiResponse<MessageResponse>,

            // Errors
            ErrorResponse,
            ErrorDetail,
        )
    ),
    tags(
        (name = "health", description = "Liveness and database status"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "jobs", description = "Job postings"),
        (name = "users", description = "The authenticated user's profile"),
        (name = "applications", description = "The authenticated user's applications"),
        (name = "bookmarks", description = "The authenticated user's bookmarks")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
