use crate::shared::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_qs::Config;

/// Query string extractor backed by `serde_qs`, so list parameters such as
/// `tech_stacks[0]=Rust&tech_stacks[1]=Go` deserialize into a `Vec`.
pub struct Qs<T>(pub T);

impl<T, S> FromRequestParts<S> for Qs<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        Config::default()
            .deserialize_str::<T>(query)
            .map(Qs)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected query string");
                AppError::ValidationError(format!("Invalid query parameters: {}", e))
            })
    }
}
