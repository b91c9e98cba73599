use jobboard::infrastructure::config::AppConfig;
use jobboard::infrastructure::{auth, db, password, state::AppState};
use jobboard::presentation;

use dotenvy::dotenv;
use std::env;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_with_signal().await
}

async fn run_with_signal() -> anyhow::Result<()> {
    run(None, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// `port` overrides `APP_PORT` when given
async fn run<F>(port: Option<u16>, shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();

    // Tests may call this more than once per process
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "jobboard=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let mut config = AppConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }

    let (listener, app, pool) = bootstrap(&config).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    pool.close();
    tracing::info!("server stopped");

    Ok(())
}

async fn bootstrap(
    config: &AppConfig,
) -> anyhow::Result<(tokio::net::TcpListener, axum::Router, db::DbPool)> {
    let pool = db::create_pool(config).await?;
    tracing::info!(size = config.pool.max_size, "connection pool ready");

    {
        let mut conn = pool.acquire().await?;
        sqlx::migrate!().run(&mut *conn).await?;
    }

    let token_service = Arc::new(auth::JwtTokenService::from_config(&config.jwt));
    let password_service = Arc::new(password::Argon2PasswordService::new());
    let state = AppState::new(pool.clone(), token_service, password_service);

    let cors = presentation::middleware::cors::cors_layer(&config.cors_allowed_origins)?;
    let app = presentation::router::app(state, cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    Ok((listener, app, pool))
}
