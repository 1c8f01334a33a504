use rust_decimal::Decimal;

record_id!(DeliveryAgent, "delivery_agent");

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAgent {
    pub id: DeliveryAgentId,
    pub name: String,
    pub available: bool,
    /// Mean of all ratings received; `None` until the first rated feedback.
    pub rating: Option<Decimal>,
}

impl DeliveryAgent {
    pub fn new(id: DeliveryAgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            available: true,
            rating: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryAgentCreate {
    pub name: String,
}
