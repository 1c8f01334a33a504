//! # Cart Engine
//!
//! Business rules for a customer's cart on top of a [`CartStore`](crate::cart_store::CartStore).
//! Every mutation is a read, a rule check and a conditional write; a write
//! that loses a race is retried against the fresh cart, so concurrent
//! changes to the same cart are never overwritten.
//!
//! A cart belongs to one restaurant: adding an item from another restaurant
//! is refused with [`CartError::RestaurantMismatch`].

pub mod engine;
pub mod error;
pub mod handler;

pub use engine::{AddItem, CartEngine, CartSettings};
pub use error::CartError;
pub use handler::MenuSelectionHandler;
