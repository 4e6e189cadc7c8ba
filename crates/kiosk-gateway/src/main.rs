//! Metro kiosk gateway: serves the timetable dashboard for one station.

mod routes;
mod state;

use std::sync::Arc;

use kiosk_core::KioskConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::{AppState, StartupError};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[kiosk-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("kiosk-gateway stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = KioskConfig::load()?;
    let state = Arc::new(AppState::from_config(&config)?);

    tracing::info!(
        stop = %state.transit.stop_id(),
        timezone = %state.timezone,
        template = %state.template_path.display(),
        "kiosk-gateway {} configured",
        kiosk_core::version()
    );

    let app = routes::router(state, &config.public_root);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
