//! Buying and selling shares.
//!
//! Every trade touches three tables: the user's cash, the holding for the
//! symbol and the history ledger. All of it happens inside one database
//! transaction, and the decrementing updates are conditional so that two
//! concurrent requests for the same account can never overdraw cash or sell
//! shares twice.

use chrono::Utc;
use model::entities::{
    history_entry::{self, TradeMethod},
    holding, user,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, TradingError};
use crate::quote::{Quote, QuoteProvider, normalize_symbol};

/// Outcome of an executed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReceipt {
    pub symbol: String,
    /// Signed like the history ledger: positive bought, negative sold.
    pub shares: i64,
    pub price: Decimal,
    /// Cost of a purchase or proceeds of a sale.
    pub amount: Decimal,
    pub cash_after: Decimal,
}

/// Parse a share count from form input. Only plain digit strings with a
/// positive value are accepted.
pub fn parse_shares(raw: Option<&str>) -> Result<i64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(TradingError::validation("must provide number of shares"));
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TradingError::validation("must provide valid number of shares"));
    }
    match raw.parse::<i64>() {
        Ok(shares) if shares > 0 => Ok(shares),
        _ => Err(TradingError::validation("must provide valid number of shares")),
    }
}

async fn quote_for(quotes: &dyn QuoteProvider, raw_symbol: &str) -> Result<(String, Quote)> {
    let symbol = normalize_symbol(raw_symbol)
        .ok_or_else(|| TradingError::validation("must provide valid stock symbol"))?;
    let quote = quotes
        .lookup(&symbol)
        .await
        .ok_or_else(|| TradingError::NotFound("must provide valid stock symbol".to_string()))?;
    Ok((symbol, quote))
}

async fn record_history(
    txn: &DatabaseTransaction,
    user_id: i32,
    symbol: &str,
    shares: i64,
    method: TradeMethod,
    price: Decimal,
) -> Result<()> {
    history_entry::ActiveModel {
        user_id: Set(user_id),
        symbol: Set(symbol.to_string()),
        shares: Set(shares),
        method: Set(method),
        price: Set(price),
        transacted_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn load_user(txn: &DatabaseTransaction, user_id: i32) -> Result<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(txn)
        .await?
        .ok_or_else(|| TradingError::Auth("user no longer exists".to_string()))
}

/// Buy `shares` of `symbol` at the current quote.
#[instrument(skip(db, quotes))]
pub async fn buy(
    db: &DatabaseConnection,
    quotes: &dyn QuoteProvider,
    user_id: i32,
    symbol: &str,
    shares: Option<&str>,
) -> Result<TradeReceipt> {
    trace!("Entering buy function for user_id: {}", user_id);

    let shares = parse_shares(shares)?;
    let (symbol, quote) = quote_for(quotes, symbol).await?;
    let cost = quote.price * Decimal::from(shares);
    debug!("Buying {} x {} at {} (cost {})", shares, symbol, quote.price, cost);

    let txn = db.begin().await?;

    let account = load_user(&txn, user_id).await?;
    if account.cash < cost {
        warn!(
            "Insufficient funds for user ID {}: balance {}, cost {}",
            user_id, account.cash, cost
        );
        return Err(TradingError::business_rule("insufficient funds"));
    }

    let debited = user::Entity::update_many()
        .col_expr(user::Column::Cash, Expr::col(user::Column::Cash).sub(cost))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::Cash.gte(cost))
        .exec(&txn)
        .await?;
    if debited.rows_affected == 0 {
        warn!("Balance of user ID {} changed underneath the purchase", user_id);
        return Err(TradingError::business_rule("insufficient funds"));
    }

    let existing = holding::Entity::find_by_id((user_id, symbol.clone()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        trace!("Incrementing existing holding of {}", symbol);
        holding::Entity::update_many()
            .col_expr(holding::Column::Shares, Expr::col(holding::Column::Shares).add(shares))
            .filter(holding::Column::UserId.eq(user_id))
            .filter(holding::Column::Symbol.eq(symbol.as_str()))
            .exec(&txn)
            .await?;
    } else {
        trace!("Opening new holding of {}", symbol);
        holding::ActiveModel {
            user_id: Set(user_id),
            symbol: Set(symbol.clone()),
            shares: Set(shares),
        }
        .insert(&txn)
        .await?;
    }

    record_history(&txn, user_id, &symbol, shares, TradeMethod::Buy, quote.price).await?;

    txn.commit().await?;
    info!("User ID {} bought {} x {} at {}", user_id, shares, symbol, quote.price);

    Ok(TradeReceipt {
        symbol,
        shares,
        price: quote.price,
        amount: cost,
        cash_after: account.cash - cost,
    })
}

/// Sell `shares` of `symbol` at the current quote.
#[instrument(skip(db, quotes))]
pub async fn sell(
    db: &DatabaseConnection,
    quotes: &dyn QuoteProvider,
    user_id: i32,
    symbol: &str,
    shares: Option<&str>,
) -> Result<TradeReceipt> {
    trace!("Entering sell function for user_id: {}", user_id);

    let shares = parse_shares(shares)?;
    let (symbol, quote) = quote_for(quotes, symbol).await?;
    let proceeds = quote.price * Decimal::from(shares);
    debug!("Selling {} x {} at {} (proceeds {})", shares, symbol, quote.price, proceeds);

    let txn = db.begin().await?;

    let account = load_user(&txn, user_id).await?;
    let Some(held) = holding::Entity::find_by_id((user_id, symbol.clone()))
        .one(&txn)
        .await?
    else {
        debug!("User ID {} holds no {}", user_id, symbol);
        return Err(TradingError::NotFound("must provide valid stock symbol".to_string()));
    };
    if shares > held.shares {
        warn!(
            "Oversell rejected for user ID {}: holds {} x {}, asked {}",
            user_id, held.shares, symbol, shares
        );
        return Err(TradingError::business_rule("must provide valid number of shares"));
    }

    let debited = holding::Entity::update_many()
        .col_expr(holding::Column::Shares, Expr::col(holding::Column::Shares).sub(shares))
        .filter(holding::Column::UserId.eq(user_id))
        .filter(holding::Column::Symbol.eq(symbol.as_str()))
        .filter(holding::Column::Shares.gte(shares))
        .exec(&txn)
        .await?;
    if debited.rows_affected == 0 {
        warn!("Holding of {} for user ID {} changed underneath the sale", symbol, user_id);
        return Err(TradingError::business_rule("must provide valid number of shares"));
    }

    let liquidated = holding::Entity::delete_many()
        .filter(holding::Column::UserId.eq(user_id))
        .filter(holding::Column::Symbol.eq(symbol.as_str()))
        .filter(holding::Column::Shares.lte(0))
        .exec(&txn)
        .await?;
    if liquidated.rows_affected > 0 {
        trace!("Holding of {} fully liquidated", symbol);
    }

    user::Entity::update_many()
        .col_expr(user::Column::Cash, Expr::col(user::Column::Cash).add(proceeds))
        .filter(user::Column::Id.eq(user_id))
        .exec(&txn)
        .await?;

    record_history(&txn, user_id, &symbol, -shares, TradeMethod::Sell, quote.price).await?;

    txn.commit().await?;
    info!("User ID {} sold {} x {} at {}", user_id, shares, symbol, quote.price);

    Ok(TradeReceipt {
        symbol,
        shares: -shares,
        price: quote.price,
        amount: proceeds,
        cash_after: account.cash + proceeds,
    })
}
