use crate::domain::applications::{ApplicationRepository, NewApplication};
use crate::domain::jobs::JobRepository;
use crate::domain::users::CurrentUser;
use crate::shared::error::{AppError, conflict_on_duplicate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

const ALREADY_APPLIED: &str = "Already applied for this job posting";

fn resume_or_cover_letter(req: &ApplyRequest) -> Result<(), ValidationError> {
    let has_letter = req
        .cover_letter
        .as_deref()
        .is_some_and(|letter| !letter.trim().is_empty());
    if req.resume_id.is_none() && !has_letter {
        let mut err = ValidationError::new("resume_or_cover_letter");
        err.message = Some("Either resume_id or cover_letter must be provided".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "resume_or_cover_letter", skip_on_field_errors = false))]
pub struct ApplyRequest {
    pub posting_id: i64,
    /// An existing resume owned by the caller
    pub resume_id: Option<i64>,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmittedApplication {
    pub application_id: i64,
}

pub struct ApplyUseCase {
    application_repo: Arc<dyn ApplicationRepository>,
    job_repo: Arc<dyn JobRepository>,
}

impl ApplyUseCase {
    pub fn new(
        application_repo: Arc<dyn ApplicationRepository>,
        job_repo: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            application_repo,
            job_repo,
        }
    }

    #[tracing::instrument(skip(self, user, req), fields(user_id = user.id, posting_id = req.posting_id))]
    pub async fn execute(
        &self,
        user: &CurrentUser,
        req: ApplyRequest,
    ) -> Result<SubmittedApplication, AppError> {
        if !self
            .job_repo
            .is_open(req.posting_id)
            .await
            .map_err(AppError::InternalServerError)?
        {
            return Err(AppError::NotFound("Job posting not found".to_string()));
        }

        if self
            .application_repo
            .exists(user.id, req.posting_id)
            .await
            .map_err(AppError::InternalServerError)?
        {
            return Err(AppError::Conflict(ALREADY_APPLIED.to_string()));
        }

        if let Some(resume_id) = req.resume_id {
            let owner = self
                .application_repo
                .resume_owner(resume_id)
                .await
                .map_err(AppError::InternalServerError)?;
            if owner != Some(user.id) {
                return Err(AppError::Forbidden(
                    "Not authorized to use this resume or resume does not exist".to_string(),
                ));
            }
        }

        let application_id = self
            .application_repo
            .create(NewApplication {
                user_id: user.id,
                posting_id: req.posting_id,
                resume_id: req.resume_id,
                cover_letter: req.cover_letter,
            })
            .await
            .map_err(conflict_on_duplicate(ALREADY_APPLIED))?;

        tracing::info!(application_id, "application submitted");
        Ok(SubmittedApplication { application_id })
    }
}
