use crate::infrastructure::state::AppState;
use crate::presentation::handlers::jobs;
use crate::presentation::middleware::auth::require_auth;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

/// Job posting routes - reads are public, writes need a bearer token
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(jobs::list_jobs))
        .route("/{id}", get(jobs::get_job));

    let protected = Router::new()
        .route("/", post(jobs::create_job))
        .route("/{id}", put(jobs::update_job).delete(jobs::delete_job))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
