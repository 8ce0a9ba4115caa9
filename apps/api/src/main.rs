mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod layers;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::listing::ListLimits;
use crate::applications::store::PgApplicationStore;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::layers::{build_cors_layer, with_security_headers};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tracker API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        run_migrations(&db).await?;
    }

    let list_limits = ListLimits {
        max_page_size: config.max_page_size,
        bulk_cap: config.bulk_list_cap,
    };
    info!(
        "Listing limits: page size <= {}, bulk <= {}",
        list_limits.max_page_size, list_limits.bulk_cap
    );

    // Build app state
    let state = AppState {
        store: Arc::new(PgApplicationStore::new(db)),
        list_limits,
    };

    // Build router
    let app = with_security_headers(build_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
