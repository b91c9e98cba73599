use crate::domain::bookmarks::{BookmarkRepository, BookmarkedJob};
use crate::domain::users::CurrentUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{PageRequest, SortOrder};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBookmarksQuery {
    /// `asc` | `desc` on when the bookmark was made
    pub sort: Option<String>,
    pub page: Option<i64>,
}

pub struct ListBookmarksUseCase {
    bookmark_repo: Arc<dyn BookmarkRepository>,
}

impl ListBookmarksUseCase {
    pub fn new(bookmark_repo: Arc<dyn BookmarkRepository>) -> Self {
        Self { bookmark_repo }
    }

    #[tracing::instrument(skip(self, user, query), fields(user_id = user.id))]
    pub async fn execute(
        &self,
        user: &CurrentUser,
        query: ListBookmarksQuery,
    ) -> Result<(Vec<BookmarkedJob>, PageRequest), AppError> {
        let order = SortOrder::from_param(query.sort.as_deref());
        let page = query.page.map(PageRequest::new).unwrap_or_default();

        let bookmarks = self
            .bookmark_repo
            .list(user.id, order, page)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok((bookmarks, page))
    }
}
