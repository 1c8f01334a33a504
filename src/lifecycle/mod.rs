//! # System Lifecycle
//!
//! [`DeliverySystem`] is the composition root. Backends (cart store, broker)
//! are connected by the caller and handed in, so nothing here holds global
//! connection state.
//!
//! Start-up order:
//! 1. spawn the record actors; items and feedback get the order client as
//!    their `run` context
//! 2. build the cart engine, order service and assembly saga on top of them
//! 3. spawn one consumer per inbound queue
//!
//! Shutdown reverses it: consumers are signalled through a `watch` channel
//! and finish their in-flight messages, the broker is closed, and dropping
//! the last clients lets each actor's mailbox run dry.

pub mod system;
pub mod tracing;

pub use self::tracing::setup_tracing;
pub use system::{DeliverySystem, SystemError};
