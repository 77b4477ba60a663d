use anyhow::Context;
use showup_sender::configuration::ServerSettings;
use showup_sender::telemetry::{get_subscriber, init_subscriber, shutdown_telemetry};
use showup_sender::webhook::router;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server = ServerSettings::from_env().context("Failed to read server settings")?;

    let subscriber = get_subscriber("webhook-listener".into(), server.log_level.clone());
    init_subscriber(subscriber);

    info!("Starting webhook-listener");

    let app = router().layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = server.webhook_addr()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down webhook-listener");
    shutdown_telemetry();
    served?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
