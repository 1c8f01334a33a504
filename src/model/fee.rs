use rust_decimal::Decimal;

record_id!(Fee, "fee");

/// Platform commission charged on an order. Never changes once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Fee {
    pub id: FeeId,
    pub percentage: Decimal,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct FeeCreate {
    pub percentage: Decimal,
    pub amount: Decimal,
    pub description: String,
}
