use super::{DeliveryAgentId, OrderId};

record_id!(Feedback, "feedback");

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A customer's review of a delivered order.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: FeedbackId,
    pub order_id: OrderId,
    pub delivery_agent_id: DeliveryAgentId,
    /// 1..=5 when the customer rated the agent.
    pub delivery_agent_rating: Option<u8>,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct FeedbackCreate {
    pub order_id: OrderId,
    pub delivery_agent_id: DeliveryAgentId,
    pub delivery_agent_rating: Option<u8>,
    pub comment: String,
}
