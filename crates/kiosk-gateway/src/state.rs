//! Per-process wiring: clients, renderer, and template location, built once and
//! handed to every request.

use std::path::PathBuf;

use kiosk_core::{
    ConfigError, DashboardRenderer, KioskConfig, QuoteClient, RenderError, TransitClient, Tz,
    UpstreamError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] UpstreamError),

    #[error("fragment templates failed to load: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppState {
    pub transit: TransitClient,
    pub quotes: QuoteClient,
    pub renderer: DashboardRenderer,
    /// Re-read on every request; edits show up without a restart.
    pub template_path: PathBuf,
    pub timezone: Tz,
}

impl AppState {
    /// Fails fast on a missing API key or unknown time zone.
    pub fn from_config(config: &KioskConfig) -> Result<Self, StartupError> {
        let api_key = config.api_key()?;
        let timezone = config.tz()?;
        let transit = TransitClient::from_config(config, api_key)?;
        let quotes = QuoteClient::new(config.quote_url.as_str(), config.upstream_timeout())?;

        Ok(Self {
            transit,
            quotes,
            renderer: DashboardRenderer::new()?,
            template_path: PathBuf::from(&config.template_path),
            timezone,
        })
    }
}
