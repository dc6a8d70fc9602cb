use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use odonta::api;
use odonta::config;
use odonta::core_state::CoreState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Odonta starting v{}", config::APP_VERSION);

    let core = Arc::new(CoreState::new());
    if let Err(e) = core.initialize() {
        tracing::error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    let mut server = match api::server::start_api_server(core.clone(), config::bind_addr()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start API server: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %server.addr, "Odonta API listening");

    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Cannot listen for shutdown signal, exiting");
    }

    tracing::info!("Shutting down");
    server.shutdown();
    server.wait().await;
    core.shutdown();
}
