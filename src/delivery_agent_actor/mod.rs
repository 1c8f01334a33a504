//! # Delivery Agent Actor
//!
//! Agents are created with a name, start out available and unrated, and
//! change only through [`DeliveryAgentAction`]s.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::DeliveryAgent;
use resource_actor::{ResourceActor, ResourceClient};

/// Creates a new DeliveryAgent actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<DeliveryAgent>, ResourceClient<DeliveryAgent>) {
    ResourceActor::new(buffer_size)
}
