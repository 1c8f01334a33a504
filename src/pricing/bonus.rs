use super::round_money;
use crate::model::BonusCreate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const BONUS_DESCRIPTION: &str = "Bonus based on feedback and working hours";

const FEE_SHARE: Decimal = dec!(0.5);
const BASE_BONUS: Decimal = dec!(5);
const EARLY_LATE_BONUS: Decimal = dec!(5.0);
/// Orders placed before this hour (UTC) count as early.
const EARLY_BEFORE: u32 = 9;
/// Orders placed after this hour (UTC) count as late.
const LATE_AFTER: u32 = 21;

#[derive(Debug, Clone, PartialEq)]
pub struct BonusQuote {
    pub max_bonus: Decimal,
    pub percentage: Decimal,
    pub feedback_bonus: Decimal,
    pub early_late_bonus: Decimal,
    /// Never exceeds `max_bonus`.
    pub total: Decimal,
}

impl BonusQuote {
    pub fn to_create(&self) -> BonusCreate {
        BonusCreate {
            percentage: self.percentage,
            early_late_amount: self.early_late_bonus,
            amount: self.total,
            description: BONUS_DESCRIPTION.to_string(),
        }
    }
}

/// Share of the maximum bonus earned by a customer rating.
pub fn rating_percentage(rating: Option<u8>) -> Decimal {
    match rating {
        Some(5) => dec!(0.50),
        Some(4) => dec!(0.30),
        Some(3) => dec!(0.10),
        Some(2) => dec!(0.05),
        _ => Decimal::ZERO,
    }
}

/// Bonus for delivering an order whose fee was `fee_amount`, placed at
/// `hour` (0..=23) and rated `rating`.
pub fn calculate_bonus(fee_amount: Decimal, rating: Option<u8>, hour: u32) -> BonusQuote {
    let max_bonus = fee_amount * FEE_SHARE + BASE_BONUS;
    let percentage = rating_percentage(rating);
    let feedback_bonus = percentage * max_bonus;
    let early_late_bonus = if hour < EARLY_BEFORE || hour > LATE_AFTER {
        EARLY_LATE_BONUS
    } else {
        Decimal::ZERO
    };
    let total = (feedback_bonus + early_late_bonus).min(max_bonus);

    // Exact arithmetic above, cents only in the quote.
    BonusQuote {
        max_bonus: round_money(max_bonus),
        percentage,
        feedback_bonus: round_money(feedback_bonus),
        early_late_bonus,
        total: round_money(total),
    }
}
