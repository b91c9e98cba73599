use crate::domain::applications::{ApplicationQuery, ApplicationRepository, ApplicationSummary};
use crate::domain::users::CurrentUser;
use crate::shared::error::AppError;
use crate::shared::pagination::{PageRequest, SortOrder};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListApplicationsQuery {
    /// Only applications in this status, e.g. `pending`
    pub status_filter: Option<String>,
    /// `asc` | `desc` on the application date
    pub sort_by_date: Option<String>,
    pub page: Option<i64>,
}

pub struct ListApplicationsUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
}

impl ListApplicationsUseCase {
    pub fn new(application_repo: Arc<dyn ApplicationRepository>) -> Self {
        Self { application_repo }
    }

    #[tracing::instrument(skip(self, user, query), fields(user_id = user.id))]
    pub async fn execute(
        &self,
        user: &CurrentUser,
        query: ListApplicationsQuery,
    ) -> Result<(Vec<ApplicationSummary>, PageRequest), AppError> {
        let query = ApplicationQuery {
            user_id: user.id,
            status: query.status_filter.filter(|s| !s.trim().is_empty()),
            order: SortOrder::from_param(query.sort_by_date.as_deref()),
            page: query.page.map(PageRequest::new).unwrap_or_default(),
        };

        let applications = self
            .application_repo
            .list(&query)
            .await
            .map_err(AppError::InternalServerError)?;

        Ok((applications, query.page))
    }
}
