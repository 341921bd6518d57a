use ledgerly_core::observability::init_tracing;
use ledgerly_server::config::LedgerlyConfig;
use ledgerly_server::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Config first; it carries the OTLP endpoint the tracing setup needs.
    let config = LedgerlyConfig::load()
        .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    init_tracing("ledgerly-server", "info", config.otlp_endpoint.as_deref());

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!(port = application.port(), "ledgerly-server started");

    application.run_until_stopped().await
}
