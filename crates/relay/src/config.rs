//! Process configuration, read once at startup.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Default webhook listen port.
pub const DEFAULT_PORT: u16 = 9000;

/// Default hours between purge sweeps.
const DEFAULT_PURGE_INTERVAL_HOURS: u64 = 24;

/// Relay service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    /// Record-store API token.
    pub store_token: String,
    /// Record-store base URL.
    pub store_api_url: String,
    /// Asset collection ID.
    pub assets_database_id: String,
    /// Alert collection ID.
    pub alerts_database_id: String,
    /// Purge settings; `None` disables the purge task for the process
    /// lifetime.
    pub purge: Option<PurgeConfig>,
}

/// Purge task settings.
#[derive(Debug, Clone)]
pub struct PurgeConfig {
    /// Archive alerts older than this many days.
    pub age_days: i64,
    /// Time between sweeps.
    pub interval: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    /// Returns error if a required variable is absent or unparsable. The
    /// purge age is required only when purge is enabled.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("Invalid value for PORT")?,
            Err(_) => DEFAULT_PORT,
        };

        let auto_purge = parse_bool(&require("AUTO_PURGE_ALERTS")?)
            .context("Invalid boolean value for AUTO_PURGE_ALERTS")?;

        let purge = if auto_purge {
            let age_days = require("ALERT_AGE_DAYS")?
                .parse()
                .context("Invalid value for ALERT_AGE_DAYS")?;
            let interval_hours: u64 = match env::var("PURGE_INTERVAL_HOURS") {
                Ok(raw) => raw
                    .parse()
                    .context("Invalid value for PURGE_INTERVAL_HOURS")?,
                Err(_) => DEFAULT_PURGE_INTERVAL_HOURS,
            };
            let interval_secs = interval_hours
                .checked_mul(3600)
                .context("PURGE_INTERVAL_HOURS is too large")?;
            Some(PurgeConfig {
                age_days,
                interval: Duration::from_secs(interval_secs),
            })
        } else {
            None
        };

        Ok(Self {
            port,
            store_token: require("STORE_AUTH_TOKEN")?,
            store_api_url: env::var("STORE_API_URL")
                .unwrap_or_else(|_| crate::store::DEFAULT_API_URL.to_string()),
            assets_database_id: require("ASSETS_DATABASE_ID")?,
            alerts_database_id: require("ALERTS_DATABASE_ID")?,
            purge,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{name} must be set"))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => bail!("expected a boolean, got {other:?}"),
    }
}
