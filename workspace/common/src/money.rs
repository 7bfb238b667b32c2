//! Currency formatting for display values.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};

/// Formats an amount as US dollars, always with cents, e.g. `$1,500.00`.
pub fn usd(amount: Decimal) -> String {
    let mut cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    Money::from_decimal(cents, iso::USD).to_string()
}
