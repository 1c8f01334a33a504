use rust_decimal::Decimal;

record_id!(Bonus, "bonus");

/// Delivery-agent bonus awarded for one order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bonus {
    pub id: BonusId,
    /// Share of the maximum bonus earned through the customer's rating.
    pub percentage: Decimal,
    pub early_late_amount: Decimal,
    /// Total paid out, already capped.
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct BonusCreate {
    pub percentage: Decimal,
    pub early_late_amount: Decimal,
    pub amount: Decimal,
    pub description: String,
}
