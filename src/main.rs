use std::sync::Arc;

use anyhow::Context;
use showup_sender::configuration::{ProviderSettings, ServerSettings};
use showup_sender::dispatcher::WhatsAppDispatcher;
use showup_sender::intake::{AppState, router};
use showup_sender::telemetry::{get_subscriber, init_subscriber, shutdown_telemetry};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server = ServerSettings::from_env().context("Failed to read server settings")?;

    let subscriber = get_subscriber("showup-sender".into(), server.log_level.clone());
    init_subscriber(subscriber);

    info!("Starting showup-sender");

    let provider = match ProviderSettings::from_env() {
        Ok(provider) => provider,
        Err(e) => {
            error!("Refusing to start without provider configuration: {}", e);
            return Err(e.into());
        }
    };

    if provider.phone_number_id.is_none() {
        warn!("No default sender phone number id configured, /send-template requires \"from\"");
    }

    let default_sender = provider.phone_number_id.clone();
    let dispatcher = WhatsAppDispatcher::new(provider)?;

    let app = router(AppState::new(Arc::new(dispatcher), default_sender))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = server.sender_addr()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down showup-sender");
    shutdown_telemetry();
    served?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
