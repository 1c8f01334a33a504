//! # food-delivery
//!
//! > **Carts, orders and payouts for a food delivery platform.**
//!
//! Customers fill a cart kept in a shared cache, publish it, and an
//! event-driven saga turns it into a durable order. Afterwards the order
//! moves through its delivery lifecycle, and customer feedback drives the
//! delivery agent's bonus and rating.
//!
//! ## 🏗️ Design
//!
//! ### 1. Carts: optimistic concurrency
//! A cart is one JSON value per customer in a [`cart_store::CartStore`]. The
//! [`cart::CartEngine`] never locks it: it reads, applies the rule, and writes
//! only if nobody else wrote in between, retrying on conflict.
//!
//! ### 2. Records: resource actors
//! Orders, line items, fees, bonuses, feedback and delivery agents each live
//! behind a `ResourceActor` from the `resource-actor` crate. Each actor owns
//! its records and handles one request at a time; the rest of the crate
//! talks to them through typed [`clients`].
//!
//! ### 3. Events: acknowledge after handling
//! Services meet on named queues ([`events`]). A message is acknowledged only
//! once its handler succeeded, requeued on transient failure, and moved to a
//! dead-letter queue when it can never succeed.
//!
//! ### 4. Money
//! All amounts are [`rust_decimal::Decimal`]; JSON carries them as numbers.
//!
//! ## 🗺️ Module Tour
//!
//! - [`model`]: plain data (carts, orders, fees, bonuses, feedback, agents)
//! - [`events`], [`broker`]: the event envelope, queues and consumer loop
//! - [`cart_store`], [`cart`]: cart storage and cart rules
//! - [`order_actor`], [`delivery_agent_actor`], [`records`]: record actors
//! - [`clients`], [`repository`]: typed access to the record actors
//! - [`pricing`]: fee and bonus calculations
//! - [`saga`]: published cart → order
//! - [`orders`]: status changes, agent assignment, feedback
//! - [`config`], [`lifecycle`]: configuration, tracing, composition root
//!
//! ## 🚀 Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! FOOD_DELIVERY__CACHE__BACKEND=redis cargo run --features redis
//! ```

pub mod broker;
pub mod cart;
pub mod cart_store;
pub mod clients;
pub mod config;
pub mod delivery_agent_actor;
pub mod events;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod orders;
pub mod pricing;
pub mod records;
pub mod repository;
pub mod saga;
