use crate::infrastructure::pool::PoolStatus;
use crate::infrastructure::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "connected")]
    pub database: String,
    pub pool: PoolStatus,
}

/// Health check with a round trip through a pooled connection
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthReport),
        (status = 503, description = "No connection available or database down", body = HealthReport)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let connected = match state.pool.acquire().await {
        Ok(mut conn) => match sqlx::query("SELECT 1").execute(&mut *conn).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Database health check failed: {:?}", conn.note_failure(e));
                false
            }
        },
        Err(e) => {
            tracing::error!("Database health check could not get a connection: {}", e);
            false
        }
    };

    // Sampled after the probe connection went back
    let pool = state.pool.status();

    if connected {
        (
            StatusCode::OK,
            Json(HealthReport {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                pool,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport {
                status: "unhealthy".to_string(),
                database: "disconnected".to_string(),
                pool,
            }),
        )
    }
}
