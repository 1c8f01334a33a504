//! # Pricing
//!
//! Pure money calculations: the platform fee charged on an order and the
//! bonus paid to the agent who delivered it. Nothing here touches storage;
//! the order services persist the quotes.

pub mod bonus;
pub mod fee;

pub use bonus::{calculate_bonus, rating_percentage, BonusQuote, BONUS_DESCRIPTION};
pub use fee::{calculate_fee, FeeQuote};

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
