//! RESTORANG HTTP Server Binary
//!
//! Main entry point for the REST API server. It loads the source
//! configuration, builds the data source, sets up the HTTP router and starts
//! serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the bundled fixtures (default)
//! cargo run --bin restorang-server
//!
//! # Run against a Supabase project
//! SOURCE_TYPE=rpc SUPABASE_URL=https://xyz.supabase.co SUPABASE_KEY=... \
//!   cargo run --bin restorang-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `SOURCE_TYPE`: `mock`, `rpc` or `rest` (overrides `restorang.toml`)
//! - `SUPABASE_URL`, `SUPABASE_KEY`: RPC source settings
//! - `RESTORANG_API_URL`: REST source base URL
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use restorang::http::{create_router, AppState};
use restorang::services::SubmissionQueue;
use restorang::sources::{SourceConfig, SourceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting RESTORANG HTTP Server");

    let config = match SourceConfig::from_default_location() {
        Ok(mut config) => {
            config.apply_env_overrides();
            config
        }
        Err(e) => {
            warn!("{}; using environment settings", e);
            SourceConfig::from_env()
        }
    };

    let source = SourceFactory::create(&config)?;
    info!("Data source '{}' initialized", source.name());

    let state = AppState::new(source)
        .with_submissions(SubmissionQueue::with_samples())
        .with_compare_settings(config.compare);

    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
