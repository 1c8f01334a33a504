//! Error types for the DeliveryAgent actor.

use resource_actor::FrameworkError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryAgentError {
    #[error("Delivery agent not found: {0}")]
    NotFound(String),

    #[error("Delivery agent name must not be empty")]
    EmptyName,

    #[error("Rating {0} is outside 1..=5")]
    RatingOutOfRange(Decimal),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for DeliveryAgentError {
    fn from(msg: String) -> Self {
        DeliveryAgentError::ActorCommunicationError(msg)
    }
}

impl From<FrameworkError> for DeliveryAgentError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => DeliveryAgentError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<DeliveryAgentError>() {
                Ok(agent_error) => *agent_error,
                Err(other) => DeliveryAgentError::ActorCommunicationError(other.to_string()),
            },
            other => DeliveryAgentError::ActorCommunicationError(other.to_string()),
        }
    }
}
