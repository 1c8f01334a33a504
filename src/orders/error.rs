use crate::delivery_agent_actor::DeliveryAgentError;
use crate::model::{DeliveryAgentId, OrderId};
use crate::order_actor::OrderError;
use crate::records::RecordError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Agent(#[from] DeliveryAgentError),

    #[error("order {0} has no fee")]
    MissingFee(OrderId),

    #[error("no ratings found for delivery agent {0}")]
    NoRatingsFound(DeliveryAgentId),
}
