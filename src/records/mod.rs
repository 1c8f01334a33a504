//! # Record Actors
//!
//! Order line items, fees, bonuses and feedback are written once and never
//! changed, so they share one error type and one client type
//! ([`RecordClient`](crate::clients::RecordClient)). Line items and feedback
//! refer to an order; their actors are started with an order client as
//! context and refuse records pointing at an order that does not exist.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::Order;
use resource_actor::{ActorEntity, ResourceActor, ResourceClient};

/// Context of records that belong to an order.
pub type OrderLookup = ResourceClient<Order>;

/// Creates a record actor and its client.
pub fn new<T: ActorEntity>(buffer_size: usize) -> (ResourceActor<T>, ResourceClient<T>) {
    ResourceActor::new(buffer_size)
}
