//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without loading `.env`.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `artifacts-run` binary is the
//! production entry point.

use api_rest::{router, AppState};
use artifacts_core::{ArtifactService, AssemblyConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the REST API server
///
/// # Environment Variables
/// - `ARTIFACTS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `ARTIFACTS_LANGUAGE`: Document language tag (default: "en-IN")
/// - `ARTIFACTS_IDENTIFIER_SYSTEM`: Identifier system URI (default: "https://ndhm.in/phr")
/// - `ARTIFACTS_PRETTY_PRINT`: Pretty-print generated documents (default: true)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("ARTIFACTS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(AssemblyConfig::from_env_values(
        std::env::var("ARTIFACTS_LANGUAGE").ok(),
        std::env::var("ARTIFACTS_IDENTIFIER_SYSTEM").ok(),
        std::env::var("ARTIFACTS_PRETTY_PRINT").ok(),
    )?);

    tracing::info!("-- Starting clinical artifacts REST API on {}", addr);

    let app = router(AppState::new(ArtifactService::new(cfg)));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
