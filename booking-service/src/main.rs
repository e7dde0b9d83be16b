use booking_service::config::BookingConfig;
use booking_service::services::init_metrics;
use booking_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BookingConfig::load()?;

    init_tracing(
        "booking-service",
        &config.common.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );
    init_metrics()?;

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
