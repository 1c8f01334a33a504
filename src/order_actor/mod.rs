//! # Order Actor
//!
//! Orders are created once by the assembly saga and afterwards only move
//! through [`OrderAction`]s: status changes, agent assignment and bonus
//! attachment. There is no free-form update, so every change goes through the
//! state machine in [`OrderStatus`](crate::model::OrderStatus).
//!
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Order`]
//! - [`actions`]: [`OrderAction`]
//! - [`error`]: [`OrderError`]
//!
//! ```rust
//! use food_delivery::order_actor::{self, OrderAction};
//! use food_delivery::model::{FeeId, OrderCreate, OrderStatus};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = order_actor::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create(OrderCreate {
//!             total_amount: dec!(25.98),
//!             vat_amount: dec!(5.20),
//!             timestamp: chrono::Utc::now(),
//!             comment: String::new(),
//!             customer_id: 1,
//!             restaurant_id: 2,
//!             fee_id: FeeId(1),
//!         })
//!         .await
//!         .unwrap();
//!
//!     let order = client
//!         .perform_action(id, OrderAction::ChangeStatus(OrderStatus::OnItsWay))
//!         .await
//!         .unwrap();
//!     assert_eq!(order.status, OrderStatus::OnItsWay);
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Order;
use resource_actor::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
