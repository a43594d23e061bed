//! # Taskboard API Server
//!
//! Serves the REST API for projects, boards, tasks, comments and
//! notifications, plus the `/ws` realtime channel.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Connect the PostgreSQL pool and run embedded migrations
//! 3. Build the realtime hub, and the Redis relay when `REDIS_URL` is set
//! 4. Serve until Ctrl-C, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard JWT_SECRET=... cargo run -p taskboard-api
//! ```

use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    realtime::{hub::TopicHub, relay::RedisRelay, Fanout},
    redis::{sanitize_url, RedisClient, RedisConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let hub = Arc::new(TopicHub::new(config.realtime.channel_capacity));
    let (fanout, relay_listener) = match &config.realtime.redis_url {
        Some(url) => {
            let client = RedisClient::new(RedisConfig::new(url.clone())).await?;
            let relay = Arc::new(RedisRelay::new(client));
            tracing::info!(
                redis_url = %sanitize_url(url),
                instance_id = %relay.instance_id(),
                "Realtime relay enabled"
            );

            let listener = relay.clone().spawn_listener(hub.clone());
            (Fanout::with_relay(hub, relay), Some(listener))
        }
        None => {
            tracing::info!("Realtime relay disabled; fan-out is local to this instance");
            (Fanout::local(hub), None)
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, fanout));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = relay_listener {
        handle.abort();
    }
    close_pool(pool).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
