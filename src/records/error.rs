use crate::model::OrderId;
use resource_actor::FrameworkError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Quantity of {0:?} must be greater than zero")]
    InvalidQuantity(String),

    #[error("Amount cannot be negative, got {0}")]
    InvalidAmount(Decimal),

    #[error("Order {0} does not exist")]
    UnknownOrder(OrderId),

    #[error("Could not look up order: {0}")]
    OrderLookup(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl RecordError {
    /// Errors caused by the record itself; retrying cannot help.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::OrderLookup(_) | Self::ActorCommunicationError(_)
        )
    }
}

impl From<String> for RecordError {
    fn from(msg: String) -> Self {
        RecordError::ActorCommunicationError(msg)
    }
}

impl From<FrameworkError> for RecordError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => RecordError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<RecordError>() {
                Ok(record_error) => *record_error,
                Err(other) => RecordError::ActorCommunicationError(other.to_string()),
            },
            other => RecordError::ActorCommunicationError(other.to_string()),
        }
    }
}
