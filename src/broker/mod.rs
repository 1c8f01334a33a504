//! # Message broker
//!
//! Named-queue transport behind the [`Broker`] trait. Every consumer bound to
//! a queue receives each message published to it, and a message stays
//! outstanding until the consumer settles it: [`Delivery::ack`] after
//! successful handling, [`Delivery::requeue`] for another attempt, or
//! [`Delivery::dead_letter`] to park a poison message on
//! [`dead_letter_queue`](crate::events::dead_letter_queue).
//!
//! Backends: [`memory::InMemoryBroker`] (default, used by tests) and, with the
//! `amqp` feature, [`amqp::AmqpBroker`].

#[cfg(feature = "amqp")]
pub mod amqp;
pub mod consumer;
pub mod memory;
pub mod publisher;

pub use consumer::{spawn_consumer, ConsumerSettings, EventHandler, HandlerError};
pub use memory::{InMemoryBroker, QueueStats};
pub use publisher::EventPublisher;

use crate::events::EventError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker connection error: {0}")]
    Connection(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("subscribe failed: {0}")]
    Subscribe(String),
    #[error("settling delivery failed: {0}")]
    Settle(String),
    #[error("broker call timed out after {0:?}")]
    Timeout(Duration),
    #[error("broker is closed")]
    Closed,
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Stream of deliveries for one consumer.
pub type Subscription = mpsc::UnboundedReceiver<Delivery>;

#[async_trait]
pub trait Broker: Send + Sync + 'static {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BrokerError>;

    /// Binds a new consumer to `queue`.
    async fn subscribe(&self, queue: &str) -> Result<Subscription, BrokerError>;

    /// Stops accepting publishes and ends every subscription.
    async fn close(&self) -> Result<(), BrokerError>;
}

/// Backend hook that settles one delivery.
#[async_trait]
pub trait Settle: Send + Sync {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError>;
    async fn requeue(self: Box<Self>, body: Vec<u8>, attempt: u32) -> Result<(), BrokerError>;
    async fn dead_letter(self: Box<Self>, body: Vec<u8>) -> Result<(), BrokerError>;
}

/// One message handed to a consumer. It must be settled exactly once.
pub struct Delivery {
    queue: String,
    body: Vec<u8>,
    attempt: u32,
    settle: Box<dyn Settle>,
}

impl Delivery {
    pub fn new(
        queue: impl Into<String>,
        body: Vec<u8>,
        attempt: u32,
        settle: Box<dyn Settle>,
    ) -> Self {
        Self {
            queue: queue.into(),
            body,
            attempt,
            settle,
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 1 for the first delivery, incremented on every requeue.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub async fn ack(self) -> Result<(), BrokerError> {
        self.settle.ack().await
    }

    pub async fn requeue(self) -> Result<(), BrokerError> {
        self.settle.requeue(self.body, self.attempt + 1).await
    }

    /// Hands back a delivery that was never processed, keeping its attempt count.
    pub async fn release(self) -> Result<(), BrokerError> {
        self.settle.requeue(self.body, self.attempt).await
    }

    pub async fn dead_letter(self) -> Result<(), BrokerError> {
        self.settle.dead_letter(self.body).await
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("queue", &self.queue)
            .field("bytes", &self.body.len())
            .field("attempt", &self.attempt)
            .finish()
    }
}
