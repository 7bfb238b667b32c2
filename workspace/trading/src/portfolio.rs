//! Read-only views over a user's account: the valued portfolio, the trade
//! history and the list of sellable holdings.

use common::{HeldSymbol, HistoryRow, PortfolioRow, PortfolioView, usd};
use model::entities::{history_entry, holding, user};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument, trace, warn};

use crate::error::{Result, TradingError};
use crate::quote::QuoteProvider;

async fn holdings_of(db: &DatabaseConnection, user_id: i32) -> Result<Vec<holding::Model>> {
    Ok(holding::Entity::find()
        .filter(holding::Column::UserId.eq(user_id))
        .order_by_asc(holding::Column::Symbol)
        .all(db)
        .await?)
}

/// Value every holding at its current price.
///
/// A holding whose quote cannot be fetched is still listed, just without
/// name, price and total, and it does not count towards the total value.
#[instrument(skip(db, quotes))]
pub async fn portfolio(
    db: &DatabaseConnection,
    quotes: &dyn QuoteProvider,
    user_id: i32,
) -> Result<PortfolioView> {
    trace!("Entering portfolio function for user_id: {}", user_id);

    let account = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| TradingError::Auth("user no longer exists".to_string()))?;
    let holdings = holdings_of(db, user_id).await?;
    debug!("Valuing {} holdings for user ID {}", holdings.len(), user_id);

    let mut total_value = account.cash;
    let mut rows = Vec::with_capacity(holdings.len());
    for held in holdings {
        let mut row = PortfolioRow {
            symbol: held.symbol,
            shares: held.shares,
            name: None,
            price: None,
            total: None,
            price_usd: None,
            total_usd: None,
        };

        match quotes.lookup(&row.symbol).await {
            Some(quote) => {
                let total = quote.price * Decimal::from(row.shares);
                total_value += total;
                row.name = Some(quote.name);
                row.price_usd = Some(usd(quote.price));
                row.total_usd = Some(usd(total));
                row.price = Some(quote.price);
                row.total = Some(total);
            }
            None => warn!("No quote for {}, listing it unpriced", row.symbol),
        }
        rows.push(row);
    }

    Ok(PortfolioView {
        rows,
        cash_usd: usd(account.cash),
        cash: account.cash,
        total_value_usd: usd(total_value),
        total_value,
    })
}

/// Every recorded trade of the user, oldest first.
#[instrument(skip(db))]
pub async fn history(db: &DatabaseConnection, user_id: i32) -> Result<Vec<HistoryRow>> {
    let entries = history_entry::Entity::find()
        .filter(history_entry::Column::UserId.eq(user_id))
        .order_by_asc(history_entry::Column::Id)
        .all(db)
        .await?;
    debug!("Found {} history entries for user ID {}", entries.len(), user_id);

    Ok(entries
        .into_iter()
        .map(|entry| HistoryRow {
            method: match entry.method {
                history_entry::TradeMethod::Buy => "Buy".to_string(),
                history_entry::TradeMethod::Sell => "Sell".to_string(),
            },
            price_usd: usd(entry.price),
            symbol: entry.symbol,
            shares: entry.shares,
            price: entry.price,
            transacted_at: entry.transacted_at,
        })
        .collect())
}

/// Symbols the user can currently sell.
#[instrument(skip(db))]
pub async fn held_symbols(db: &DatabaseConnection, user_id: i32) -> Result<Vec<HeldSymbol>> {
    Ok(holdings_of(db, user_id)
        .await?
        .into_iter()
        .map(|h| HeldSymbol {
            symbol: h.symbol,
            shares: h.shares,
        })
        .collect())
}
