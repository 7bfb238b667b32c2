//! Common transport-layer types shared between the HTTP handlers and the
//! trading layer. Views carry raw decimals for clients that compute and
//! pre-formatted dollar strings for clients that only display.

mod money;

pub use money::usd;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

// ===================== Portfolio =====================

/// One line of the portfolio view.
///
/// `name`, `price` and `total` are absent when no quote could be obtained for
/// the symbol.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PortfolioRow {
    pub symbol: String,
    pub shares: i64,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub total: Option<Decimal>,
    pub price_usd: Option<String>,
    pub total_usd: Option<String>,
}

/// Holdings valued at current prices plus the cash balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PortfolioView {
    pub rows: Vec<PortfolioRow>,
    pub cash: Decimal,
    pub cash_usd: String,
    /// Cash plus the value of every holding that could be priced.
    pub total_value: Decimal,
    pub total_value_usd: String,
}

// ===================== History =====================

/// A recorded trade, as listed on the history page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HistoryRow {
    pub symbol: String,
    /// Positive for purchases, negative for sales.
    pub shares: i64,
    /// "Buy" or "Sell"
    pub method: String,
    pub price: Decimal,
    pub price_usd: String,
    pub transacted_at: DateTime<Utc>,
}

// ===================== Quotes =====================

/// Result of a successful quote lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct QuoteView {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub price_usd: String,
}

// ===================== Forms =====================

/// Symbol and share count offered on the sell form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HeldSymbol {
    pub symbol: String,
    pub shares: i64,
}

/// Describes the fields a form route accepts on POST.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FormView {
    pub form: String,
    pub fields: Vec<String>,
    /// Holdings to choose from; only populated by the sell form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holdings: Vec<HeldSymbol>,
}

impl FormView {
    pub fn new(form: &str, fields: &[&str]) -> Self {
        Self {
            form: form.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            holdings: Vec::new(),
        }
    }

    pub fn with_holdings(mut self, holdings: Vec<HeldSymbol>) -> Self {
        self.holdings = holdings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_serializes_with_success_flag() {
        let response = ApiResponse::ok(
            QuoteView {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                price: Decimal::new(15_000, 2),
                price_usd: usd(Decimal::new(15_000, 2)),
            },
            "Quote retrieved successfully",
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["symbol"], "AAPL");
        assert_eq!(json["data"]["price"], "150.00");
        assert_eq!(json["data"]["price_usd"], "$150.00");
    }

    #[test]
    fn test_form_view_omits_empty_holdings() {
        let form = FormView::new("buy", &["symbol", "shares"]);
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("holdings").is_none());

        let sell = FormView::new("sell", &["symbol", "shares"]).with_holdings(vec![HeldSymbol {
            symbol: "AAPL".to_string(),
            shares: 3,
        }]);
        let json = serde_json::to_value(&sell).unwrap();
        assert_eq!(json["holdings"][0]["shares"], 3);
    }
}
