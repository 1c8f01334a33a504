//! Structured logging setup.
//!
//! Actors log with an `entity_type` field and the services with ids such as
//! `customer_id` and `order_id`, so module paths are left out of the output.
//!
//! ```bash
//! RUST_LOG=info cargo run                          # compact logs
//! RUST_LOG=debug,resource_actor=info cargo run     # service detail, quiet actors
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
/// Calling it again is a no-op.
pub fn setup_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
