use crate::application::auth::gate::AuthenticationGate;
use crate::infrastructure::db::DbSession;
use crate::infrastructure::repositories::users::PostgresUserRepository;
use crate::infrastructure::state::AppState;
use crate::shared::error::AppError;
use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Largest request body a protected route accepts
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Gate for protected routes.
///
/// The token is checked before any connection is taken from the pool, and the
/// body is read in full before one is, so an upload never holds a pool slot.
/// On success the caller's `CurrentUser` is inserted into the request
/// extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let gate = AuthenticationGate::new(state.token_service.clone());

    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let user_id = gate.verify(authorization)?;

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        tracing::debug!(error = %e, "request body rejected");
        AppError::BadRequest("Request body is too large or could not be read".to_string())
    })?;
    let mut request = Request::from_parts(parts, Body::from(bytes));

    let session = DbSession::for_request(request.extensions_mut(), &state.pool).await?;
    let users = PostgresUserRepository::new(session);
    let user = gate.resolve(user_id, &users).await?;

    tracing::debug!(user_id = user.id, "request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
