//! Typed wrappers around [`ResourceClient`](resource_actor::ResourceClient).
//!
//! Each client translates [`FrameworkError`](resource_actor::FrameworkError)
//! into its resource's error type, unwrapping entity errors so callers can
//! match on them directly.

pub mod delivery_agent_client;
pub mod order_client;
pub mod record_client;

pub use delivery_agent_client::*;
pub use order_client::*;
pub use record_client::*;
