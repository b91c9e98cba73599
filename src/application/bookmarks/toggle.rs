use crate::domain::bookmarks::BookmarkRepository;
use crate::domain::jobs::JobRepository;
use crate::domain::users::CurrentUser;
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ToggleBookmarkRequest {
    #[validate(range(min = 1, message = "posting_id is required"))]
    pub posting_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarkToggled {
    pub posting_id: i64,
    /// `true` when the posting is now bookmarked
    pub bookmarked: bool,
    #[schema(example = "Bookmark added")]
    pub message: String,
}

pub struct ToggleBookmarkUseCase {
    bookmark_repo: Arc<dyn BookmarkRepository>,
    job_repo: Arc<dyn JobRepository>,
}

impl ToggleBookmarkUseCase {
    pub fn new(bookmark_repo: Arc<dyn BookmarkRepository>, job_repo: Arc<dyn JobRepository>) -> Self {
        Self {
            bookmark_repo,
            job_repo,
        }
    }

    #[tracing::instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn execute(
        &self,
        user: &CurrentUser,
        posting_id: i64,
    ) -> Result<BookmarkToggled, AppError> {
        if !self
            .job_repo
            .is_open(posting_id)
            .await
            .map_err(AppError::InternalServerError)?
        {
            return Err(AppError::NotFound("Job posting not found".to_string()));
        }

        let existing = self
            .bookmark_repo
            .find(user.id, posting_id)
            .await
            .map_err(AppError::InternalServerError)?;

        let bookmarked = match existing {
            Some(bookmark_id) => {
                self.bookmark_repo
                    .remove(bookmark_id)
                    .await
                    .map_err(AppError::InternalServerError)?;
                false
            }
            None => {
                self.bookmark_repo
                    .add(user.id, posting_id)
                    .await
                    .map_err(AppError::InternalServerError)?;
                true
            }
        };

        Ok(BookmarkToggled {
            posting_id,
            bookmarked,
            message: if bookmarked {
                "Bookmark added"
            } else {
                "Bookmark removed"
            }
            .to_string(),
        })
    }
}
