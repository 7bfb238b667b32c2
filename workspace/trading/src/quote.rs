//! Stock quote providers.
//!
//! A provider answers "what does one share of SYMBOL cost right now". Callers
//! only care whether a usable quote came back, so [`QuoteProvider::lookup`]
//! folds unknown symbols and upstream failures into `None`; the distinction
//! survives in the logs.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use common::{QuoteView, usd};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{Result, TradingError};

/// A point-in-time price for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    #[error("request to {provider} timed out")]
    Timeout { provider: String },

    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned an unusable response: {message}")]
    InvalidResponse { provider: String, message: String },
}

/// Trims and upper-cases a user supplied symbol. Blank input yields `None`.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_uppercase())
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for an already normalized symbol.
    async fn fetch_quote(&self, symbol: &str) -> std::result::Result<Quote, QuoteError>;

    /// Look up a quote, treating every failure as "no quote".
    async fn lookup(&self, symbol: &str) -> Option<Quote> {
        let symbol = normalize_symbol(symbol)?;
        match self.fetch_quote(&symbol).await {
            Ok(quote) => Some(quote),
            Err(QuoteError::UnknownSymbol(_)) => {
                debug!(provider = self.id(), %symbol, "No quote for unknown symbol");
                None
            }
            Err(e) => {
                warn!(provider = self.id(), %symbol, error = %e, "Quote lookup failed");
                None
            }
        }
    }
}

/// Resolve a symbol into a displayable quote.
#[instrument(skip(provider))]
pub async fn get_quote(provider: &dyn QuoteProvider, symbol: &str) -> Result<QuoteView> {
    let quote = provider
        .lookup(symbol)
        .await
        .ok_or_else(|| TradingError::NotFound("invalid stock symbol".to_string()))?;

    Ok(QuoteView {
        price_usd: usd(quote.price),
        symbol: quote.symbol,
        name: quote.name,
        price: quote.price,
    })
}

// ============================================================================
// HTTP provider
// ============================================================================

const HTTP_PROVIDER_ID: &str = "HTTP";

/// Response from the `/stock/{symbol}/quote` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    symbol: Option<String>,
    company_name: Option<String>,
    latest_price: Option<f64>,
}

/// Quote provider speaking the IEX-style `/stock/{symbol}/quote` JSON API.
pub struct HttpQuoteProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpQuoteProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request_error(e: reqwest::Error) -> QuoteError {
        if e.is_timeout() {
            QuoteError::Timeout {
                provider: HTTP_PROVIDER_ID.to_string(),
            }
        } else {
            QuoteError::Request {
                provider: HTTP_PROVIDER_ID.to_string(),
                message: e.to_string(),
            }
        }
    }

    /// `{base_url}/stock/{symbol}/quote`, with the symbol encoded as a single
    /// path segment.
    fn quote_url(&self, symbol: &str) -> std::result::Result<Url, QuoteError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| QuoteError::Request {
            provider: HTTP_PROVIDER_ID.to_string(),
            message: format!("invalid base URL {}: {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| QuoteError::Request {
                provider: HTTP_PROVIDER_ID.to_string(),
                message: format!("base URL {} cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["stock", symbol, "quote"]);
        Ok(url)
    }

    fn invalid(message: impl Into<String>) -> QuoteError {
        QuoteError::InvalidResponse {
            provider: HTTP_PROVIDER_ID.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn id(&self) -> &'static str {
        HTTP_PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> std::result::Result<Quote, QuoteError> {
        let url = self.quote_url(symbol)?;
        debug!("Quote request: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuoteError::UnknownSymbol(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(QuoteError::Request {
                provider: HTTP_PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body: QuoteResponse = response.json().await.map_err(Self::request_error)?;
        let latest_price = body
            .latest_price
            .ok_or_else(|| Self::invalid("missing latestPrice"))?;
        let price = Decimal::from_f64(latest_price)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| Self::invalid(format!("unusable price {}", latest_price)))?
            .round_dp(4);

        Ok(Quote {
            symbol: body.symbol.unwrap_or_else(|| symbol.to_string()),
            name: body.company_name.unwrap_or_else(|| symbol.to_string()),
            price,
        })
    }
}

// ============================================================================
// Static provider
// ============================================================================

const STATIC_PROVIDER_ID: &str = "STATIC";

/// In-memory price table. Prices can be changed while the provider is shared,
/// and individual symbols can be marked unavailable to mimic upstream outages.
#[derive(Default)]
pub struct StaticQuoteProvider {
    quotes: RwLock<HashMap<String, Quote>>,
    unavailable: RwLock<HashSet<String>>,
}

impl StaticQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, symbol: &str, name: &str, price: Decimal) -> Self {
        self.set_quote(symbol, name, price);
        self
    }

    pub fn set_quote(&self, symbol: &str, name: &str, price: Decimal) {
        let Some(symbol) = normalize_symbol(symbol) else {
            return;
        };
        let quote = Quote {
            symbol: symbol.clone(),
            name: name.to_string(),
            price,
        };
        if let Ok(mut quotes) = self.quotes.write() {
            quotes.insert(symbol, quote);
        }
    }

    /// Update the price of a symbol, keeping its name.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let Some(symbol) = normalize_symbol(symbol) else {
            return;
        };
        if let Ok(mut quotes) = self.quotes.write() {
            if let Some(quote) = quotes.get_mut(&symbol) {
                quote.price = price;
            }
        }
    }

    pub fn set_unavailable(&self, symbol: &str, unavailable: bool) {
        let Some(symbol) = normalize_symbol(symbol) else {
            return;
        };
        if let Ok(mut set) = self.unavailable.write() {
            if unavailable {
                set.insert(symbol);
            } else {
                set.remove(&symbol);
            }
        }
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    fn id(&self) -> &'static str {
        STATIC_PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> std::result::Result<Quote, QuoteError> {
        let outage = self
            .unavailable
            .read()
            .map(|set| set.contains(symbol))
            .unwrap_or(false);
        if outage {
            return Err(QuoteError::Request {
                provider: STATIC_PROVIDER_ID.to_string(),
                message: format!("{} is unavailable", symbol),
            });
        }

        self.quotes
            .read()
            .ok()
            .and_then(|quotes| quotes.get(symbol).cloned())
            .ok_or_else(|| QuoteError::UnknownSymbol(symbol.to_string()))
    }
}
