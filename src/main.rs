use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use buyagent_web::{
    app, cache::AppCache, config::Config, emails::LogMailer, rate_limit::RateLimiter, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("buyagent_web=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    info!("Connecting to database...");
    let db = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("running migrations")?;

    let state = AppState {
        db,
        cache: AppCache::new(),
        rate_limiter: Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        )),
        mailer: Arc::new(LogMailer),
        config: Arc::new(config),
    };

    let listener = TcpListener::bind(&state.config.bind_addr)
        .await
        .with_context(|| format!("binding {}", state.config.bind_addr))?;
    info!("Server running on {}", state.config.bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
