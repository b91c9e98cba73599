use crate::application::bookmarks::list::{ListBookmarksQuery, ListBookmarksUseCase};
use crate::application::bookmarks::toggle::{
    BookmarkToggled, ToggleBookmarkRequest, ToggleBookmarkUseCase,
};
use crate::domain::bookmarks::BookmarkedJob;
use crate::domain::users::CurrentUser;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::bookmarks::PostgresBookmarkRepository;
use crate::infrastructure::repositories::jobs::PostgresJobRepository;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::pagination::PAGE_SIZE;
use crate::shared::query::Qs;
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;
use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;

/// Bookmark a posting, or remove the bookmark if it already exists
#[utoipa::path(
    post,
    path = "/users/bookmarks",
    request_body = ToggleBookmarkRequest,
    responses(
        (status = 200, description = "Bookmark added or removed", body = ApiResponse<BookmarkToggled>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Posting not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "bookmarks",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn toggle_bookmark(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    ValidatedJson(req): ValidatedJson<ToggleBookmarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = ToggleBookmarkUseCase::new(
        Arc::new(PostgresBookmarkRepository::new(session.clone())),
        Arc::new(PostgresJobRepository::new(session)),
    );

    let toggled = use_case.execute(&user, req.posting_id).await?;

    Ok((StatusCode::OK, Json(ApiResponse::new(toggled))))
}

#[utoipa::path(
    get,
    path = "/users/bookmarks",
    params(ListBookmarksQuery),
    responses(
        (status = 200, description = "One page of bookmarked postings", body = ApiResponse<Vec<BookmarkedJob>>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    tag = "bookmarks",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_bookmarks(
    Extension(user): Extension<CurrentUser>,
    session: DbSession,
    Qs(query): Qs<ListBookmarksQuery>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = ListBookmarksUseCase::new(Arc::new(PostgresBookmarkRepository::new(session)));

    let (bookmarks, page) = use_case.execute(&user, query).await?;

    Ok((
        StatusCode::OK,
        Json(
            ApiResponse::new(bookmarks)
                .with_meta(json!({ "page": page.number(), "page_size": PAGE_SIZE })),
        ),
    ))
}
