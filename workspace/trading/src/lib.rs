//! Business layer of the trading simulator: accounts, trades, portfolio
//! valuation and quote lookup on top of the `model` entities.

pub mod accounts;
pub mod error;
pub mod password;
pub mod portfolio;
pub mod quote;
pub mod trade;

#[cfg(test)]
mod testing;

pub use error::{Result, TradingError};
pub use quote::{HttpQuoteProvider, Quote, QuoteProvider, StaticQuoteProvider};
pub use trade::TradeReceipt;
