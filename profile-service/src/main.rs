use profile_service::config::ProfileServiceConfig;
use profile_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT")
        .ok()
        .filter(|endpoint| !endpoint.is_empty());
    init_tracing("profile-service", "info", otlp_endpoint.as_deref())?;

    init_metrics()?;

    let config = ProfileServiceConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let app = Application::build(config).await?;
    tracing::info!(
        "Starting profile-service on port {}",
        app.http_port()
    );

    app.run_until_stopped().await?;

    Ok(())
}
