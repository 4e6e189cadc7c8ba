//! Kiosk configuration.
//!
//! Loaded from built-in defaults, then `config/kiosk.toml` (or the file named by
//! `KIOSK_CONFIG`), then `KIOSK__*` environment overrides.
//!
//! | Key | Default |
//! |-----|---------|
//! | listen_addr | 0.0.0.0:3000 |
//! | public_root | public |
//! | template_path | public/dashboard.html |
//! | stop_id | HSL:2314601 |
//! | timezone | Europe/Helsinki |
//! | departure_count | 5 |
//! | upstream_timeout_secs | 5 |
//!
//! The transit API key is never read from the file; it comes from the variable
//! named by `api_key_env` (default `HSL_ACCESS_KEY`).

use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/kiosk.toml";

/// A stop further down the line whose arrival time is shown on each departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamStop {
    pub label: String,
    /// Provider id, matched against `stop.gtfsId` in the trip's stop sequence.
    pub stop_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    pub listen_addr: String,
    pub public_root: String,
    pub template_path: String,
    pub stop_id: String,
    pub transit_url: String,
    pub subscription_header: String,
    pub quote_url: String,
    pub timezone: String,
    pub departure_count: u32,
    pub upstream_timeout_secs: u64,
    pub api_key_env: String,
    #[serde(default)]
    pub downstream_stops: Vec<DownstreamStop>,
}

impl KioskConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("KIOSK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Defaults, then `path` when it exists, then `KIOSK__*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .set_default("listen_addr", "0.0.0.0:3000")?
            .set_default("public_root", "public")?
            .set_default("template_path", "public/dashboard.html")?
            .set_default("stop_id", "HSL:2314601")?
            .set_default(
                "transit_url",
                "https://api.digitransit.fi/routing/v1/routers/hsl/index/graphql",
            )?
            .set_default("subscription_header", "digitransit-subscription-key")?
            .set_default("quote_url", "https://zenquotes.io/api/today")?
            .set_default("timezone", "Europe/Helsinki")?
            .set_default("departure_count", 5_i64)?
            .set_default("upstream_timeout_secs", 5_i64)?
            .set_default("api_key_env", "HSL_ACCESS_KEY")?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("KIOSK").separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Reads the transit API key. Missing or blank fails, so we never send an empty key.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        api_key_from(&self.api_key_env, std::env::var(&self.api_key_env).ok())
    }
}

fn api_key_from(name: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingApiKey(name.to_string()))
}
