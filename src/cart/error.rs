use crate::broker::{BrokerError, HandlerError};
use crate::cart_store::StoreError;
use crate::model::{CustomerId, RestaurantId};
use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be greater than zero, got {0}")]
    InvalidQuantity(i64),

    #[error("quantity cannot be negative, got {0}")]
    NegativeQuantity(i64),

    #[error("price cannot be negative, got {0}")]
    InvalidPrice(Decimal),

    #[error("item {item_id} not found in cart for customer ID {customer_id}")]
    ItemNotFound {
        customer_id: CustomerId,
        item_id: u32,
    },

    #[error("cart for customer ID {0} does not exist")]
    CartNotFound(CustomerId),

    #[error(
        "cart for customer ID {customer_id} holds items from restaurant {cart_restaurant}, \
         cannot add items from restaurant {requested}"
    )]
    RestaurantMismatch {
        customer_id: CustomerId,
        cart_restaurant: RestaurantId,
        requested: RestaurantId,
    },

    #[error("failed to retrieve shopping cart: {0}")]
    Store(#[from] StoreError),

    #[error("failed to unmarshal shopping cart: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode shopping cart: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to publish cart event: {0}")]
    Publish(#[from] BrokerError),
}

impl CartError {
    /// Errors caused by the request itself; retrying cannot help.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuantity(_)
                | Self::NegativeQuantity(_)
                | Self::InvalidPrice(_)
                | Self::ItemNotFound { .. }
                | Self::CartNotFound(_)
                | Self::RestaurantMismatch { .. }
                | Self::Corrupt(_)
                | Self::Encode(_)
        )
    }
}

impl From<CartError> for HandlerError {
    fn from(e: CartError) -> Self {
        if e.is_rejection() {
            HandlerError::Rejected(e.to_string())
        } else {
            HandlerError::Transient(e.to_string())
        }
    }
}
