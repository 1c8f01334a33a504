use super::round_money;
use crate::model::FeeCreate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Upper bound of each bracket (inclusive) and its rate. Amounts above the
/// last bound pay [`TOP_RATE`].
const BRACKETS: [(Decimal, Decimal); 3] = [
    (dec!(100), dec!(0.06)),
    (dec!(500), dec!(0.05)),
    (dec!(1000), dec!(0.04)),
];
const TOP_RATE: Decimal = dec!(0.03);

#[derive(Debug, Clone, PartialEq)]
pub struct FeeQuote {
    /// Order amount the fee was computed from, VAT excluded.
    pub base: Decimal,
    pub percentage: Decimal,
    /// `base * percentage`, rounded to cents.
    pub amount: Decimal,
}

impl FeeQuote {
    /// Names the bracket the order fell into, e.g. `"5% fee for orders over 100 up to 500"`.
    pub fn description(&self) -> String {
        let percent = (self.percentage * dec!(100)).normalize();
        let mut lower: Option<Decimal> = None;
        for (upper, rate) in BRACKETS {
            if rate == self.percentage {
                return match lower {
                    None => format!("{percent}% fee for orders up to {upper}"),
                    Some(lower) => format!("{percent}% fee for orders over {lower} up to {upper}"),
                };
            }
            lower = Some(upper);
        }
        let (last, _) = BRACKETS[BRACKETS.len() - 1];
        format!("{percent}% fee for orders over {last}")
    }

    pub fn to_create(&self) -> FeeCreate {
        FeeCreate {
            percentage: self.percentage,
            amount: self.amount,
            description: self.description(),
        }
    }
}

/// Fee for an order of `amount` (VAT excluded).
pub fn calculate_fee(amount: Decimal) -> FeeQuote {
    let percentage = BRACKETS
        .iter()
        .find(|(upper, _)| amount <= *upper)
        .map(|(_, rate)| *rate)
        .unwrap_or(TOP_RATE);
    FeeQuote {
        base: amount,
        percentage,
        amount: round_money(amount * percentage),
    }
}
