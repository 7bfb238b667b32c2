use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info, warn};
use trading::{HttpQuoteProvider, QuoteProvider, StaticQuoteProvider};

use crate::schemas::AppState;
use crate::session::SessionStore;

/// Application settings.
///
/// Sources, lowest priority first: built-in defaults, an optional
/// `finance.toml` in the working directory, then `FINANCE_*` environment
/// variables (nested keys use `__`, e.g. `FINANCE_QUOTE__API_KEY`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Cash credited to newly registered users
    pub starting_cash: Decimal,
    pub session: SessionSettings,
    pub quote: QuoteSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Sessions unused for this long are dropped
    pub idle_timeout_secs: u64,
    pub max_sessions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProviderKind {
    Http,
    Static,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSettings {
    pub provider: QuoteProviderKind,
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Price table for the static provider
    #[serde(default)]
    pub prices: HashMap<String, Decimal>,
}

impl Settings {
    /// Load settings from defaults, `finance.toml` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_config(
            Self::builder()?
                .add_source(File::with_name("finance").required(false))
                .add_source(
                    Environment::with_prefix("FINANCE")
                        .prefix_separator("_")
                        .separator("__"),
                )
                .build()?,
        )
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("database_url", "sqlite://finance.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("starting_cash", "10000.00")?
            .set_default("session.cookie_name", "session")?
            .set_default("session.idle_timeout_secs", 3600)?
            .set_default("session.max_sessions", 10_000)?
            .set_default("quote.provider", "http")?
            .set_default("quote.base_url", "https://cloud.iexapis.com/stable")?
            .set_default("quote.api_key", "")?
            .set_default("quote.timeout_secs", 10)?)
    }

    fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        if settings.starting_cash < Decimal::ZERO {
            anyhow::bail!("starting_cash must not be negative");
        }
        Ok(settings)
    }

    /// Built-in defaults only, ignoring files and environment.
    pub fn defaults() -> Result<Self> {
        Self::from_config(Self::builder()?.build()?)
    }
}

/// Build the quote provider selected in the settings.
pub fn build_quote_provider(settings: &QuoteSettings) -> Arc<dyn QuoteProvider> {
    match settings.provider {
        QuoteProviderKind::Http => {
            if settings.api_key.is_empty() {
                warn!("No quote API key configured, lookups will likely fail");
            }
            debug!("Using HTTP quote provider at {}", settings.base_url);
            Arc::new(HttpQuoteProvider::new(
                settings.base_url.clone(),
                settings.api_key.clone(),
                Duration::from_secs(settings.timeout_secs),
            ))
        }
        QuoteProviderKind::Static => {
            debug!("Using static quote provider with {} symbols", settings.prices.len());
            let provider = StaticQuoteProvider::new();
            // Config keys arrive lower-cased
            for (symbol, price) in &settings.prices {
                provider.set_quote(symbol, &symbol.to_uppercase(), *price);
            }
            Arc::new(provider)
        }
    }
}

/// Initialize application state: connect the database, build the quote
/// provider and the session store.
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    let sessions = SessionStore::new(
        settings.session.cookie_name.clone(),
        settings.session.max_sessions,
        Duration::from_secs(settings.session.idle_timeout_secs),
    );

    Ok(AppState {
        db,
        sessions,
        quotes: build_quote_provider(&settings.quote),
        starting_cash: settings.starting_cash,
    })
}
