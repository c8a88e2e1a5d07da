use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use artifacts_core::{ArtifactService, AssemblyConfig};

/// Raw configuration values as read from the environment.
struct EnvSettings {
    rest_addr: String,
    language: Option<String>,
    identifier_system: Option<String>,
    pretty: Option<String>,
}

impl EnvSettings {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            rest_addr: get("ARTIFACTS_REST_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            language: get("ARTIFACTS_LANGUAGE"),
            identifier_system: get("ARTIFACTS_IDENTIFIER_SYSTEM"),
            pretty: get("ARTIFACTS_PRETTY_PRINT"),
        }
    }

    fn assembly_config(&self) -> anyhow::Result<AssemblyConfig> {
        Ok(AssemblyConfig::from_env_values(
            self.language.clone(),
            self.identifier_system.clone(),
            self.pretty.clone(),
        )?)
    }
}

/// Main entry point for the clinical artifacts service
///
/// Loads `.env`, initialises logging, resolves configuration once and serves the REST API.
///
/// # Environment Variables
/// - `ARTIFACTS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ARTIFACTS_LANGUAGE`: Document language tag (default: "en-IN")
/// - `ARTIFACTS_IDENTIFIER_SYSTEM`: Identifier system URI (default: "https://ndhm.in/phr")
/// - `ARTIFACTS_PRETTY_PRINT`: Pretty-print generated documents (default: true)
/// - `RUST_LOG`: Additional tracing directives
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("artifacts_run=info".parse()?)
                .add_directive("artifacts_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = EnvSettings::from_env();
    let cfg = Arc::new(settings.assembly_config()?);

    tracing::info!(
        language = cfg.language(),
        identifier_system = cfg.identifier_system(),
        terms = cfg.tables().len(),
        "++ Starting clinical artifacts REST on {}",
        settings.rest_addr
    );

    let app = router(AppState::new(ArtifactService::new(cfg)));
    let listener = tokio::net::TcpListener::bind(&settings.rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}
