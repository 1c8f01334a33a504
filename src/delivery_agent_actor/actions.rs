use rust_decimal::Decimal;

/// Custom actions for delivery agents. Each returns the updated agent.
#[derive(Debug, Clone)]
pub enum DeliveryAgentAction {
    SetAvailability(bool),
    /// Stores a freshly computed aggregate rating.
    RecordRating(Decimal),
}
