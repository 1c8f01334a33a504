//! # Cart Store
//!
//! String key-value storage with optimistic concurrency. A read returns the
//! value together with a [`Revision`]; a write only lands if the key is still
//! at the revision the writer read (or still absent, when it read nothing).
//!
//! Backends: [`memory::InMemoryCartStore`] (an actor, so each request is
//! atomic) and, with the `redis` feature, [`redis::RedisCartStore`].

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::{InMemoryCartStore, StoreActor};

use crate::model::CustomerId;
use async_trait::async_trait;
use std::time::Duration;

pub fn cart_key(customer_id: CustomerId) -> String {
    format!("cart:{customer_id}")
}

/// Opaque version token of a stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub revision: Revision,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache command failed: {0}")]
    Command(String),
    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),
    #[error("cache store is closed")]
    Closed,
}

#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError>;

    /// Writes `value` if the key is still at `expected` (`None`: still absent).
    /// Returns `false` on a conflict, leaving the stored value untouched.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Revision>,
        value: String,
    ) -> Result<bool, StoreError>;

    /// Returns the number of keys removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// Removes the key only while it is still at `expected`.
    /// Returns `false` if it changed or is gone.
    async fn compare_and_delete(&self, key: &str, expected: &Revision) -> Result<bool, StoreError>;
}
