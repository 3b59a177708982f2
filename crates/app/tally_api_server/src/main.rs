//! Tally API server binary.
//!
//! Serves the HTTP API on PostgreSQL when `DATABASE_URL` is set, otherwise
//! on the in-memory store.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use tally_api::AppState;
use tally_api::config::ApiConfig;
use tally_api::services::federated::identity_verifier_from_config;
use tally_core::store::memory::MemoryStore;
use tally_core::store::postgres::PgStore;

/// CLI arguments. Anything not given here falls back to [`ApiConfig::from_env`].
#[derive(Parser, Debug)]
#[command(name = "tally_api_server", about = "Tally API server")]
struct Args {
    /// Port to listen on; overrides the port in `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL. Without it the server keeps everything in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Base URL of the web frontend.
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,

    /// OAuth client id for Google sign-in.
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tally_api=debug,tally_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(port) = args.port {
        let host = config
            .bind_addr
            .rsplit_once(':')
            .map_or("127.0.0.1", |(host, _)| host);
        config.bind_addr = format!("{host}:{port}");
    }
    if let Some(url) = args.database_url.filter(|u| !u.is_empty()) {
        config.database_url = Some(url);
    }
    if let Some(url) = args.frontend_url {
        config.frontend_url = url;
    }
    if let Some(id) = args.google_client_id.filter(|id| !id.is_empty()) {
        config.google_client_id = Some(id);
    }

    info!(?config, "starting tally_api_server");

    let identity = identity_verifier_from_config(&config);

    let state = match config.database_url.clone() {
        Some(url) => {
            info!(
                max_connections = args.max_connections,
                "configuring connection pool"
            );
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(&url)
                .await?;

            info!("running database migrations");
            tally_core::migrate::migrate(&pool).await?;

            let store = Arc::new(PgStore::new(pool));
            AppState::new(config.clone(), store.clone(), store, identity)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            AppState::new(config.clone(), store.clone(), store, identity)
        }
    };

    state.sessions.spawn_cleanup_task();

    let app = tally_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
