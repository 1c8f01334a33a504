//! In-process [`Broker`] used by tests and single-process deployments.

use super::{Broker, BrokerError, Delivery, Settle, Subscription};
use crate::events::dead_letter_queue;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedSender, WeakUnboundedSender};
use tracing::{debug, warn};

/// Per-queue counters, mainly for assertions in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub published: u64,
    pub acked: u64,
    pub requeued: u64,
    pub dead_lettered: u64,
}

#[derive(Default)]
struct QueueState {
    consumers: Vec<UnboundedSender<Delivery>>,
    /// Messages published while nobody was subscribed.
    backlog: VecDeque<Vec<u8>>,
    stats: QueueStats,
}

#[derive(Default)]
struct State {
    queues: HashMap<String, QueueState>,
    closed: bool,
}

/// Fan-out broker held entirely in memory. Cloning shares the same queues.
///
/// Messages published to a queue with no consumer are kept and handed to the
/// first consumer that subscribes.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<State>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stats(&self, queue: &str) -> QueueStats {
        self.lock()
            .queues
            .get(queue)
            .map(|q| q.stats)
            .unwrap_or_default()
    }

    /// Messages waiting on `queue` for a consumer.
    pub fn backlog(&self, queue: &str) -> Vec<Vec<u8>> {
        self.lock()
            .queues
            .get(queue)
            .map(|q| q.backlog.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn settle_for(&self, queue: &str, consumer: &UnboundedSender<Delivery>) -> Box<dyn Settle> {
        Box::new(MemorySettle {
            broker: self.clone(),
            queue: queue.to_string(),
            consumer: consumer.downgrade(),
        })
    }

    /// Delivers `body` to every live consumer of `queue`, or parks it.
    fn route(&self, state: &mut State, queue: &str, body: Vec<u8>) {
        let entry = state.queues.entry(queue.to_string()).or_default();
        entry.stats.published += 1;
        entry.consumers.retain(|consumer| !consumer.is_closed());

        if entry.consumers.is_empty() {
            debug!(queue, "No consumer bound, message parked");
            entry.backlog.push_back(body);
            return;
        }
        for consumer in &entry.consumers {
            let delivery = Delivery::new(queue, body.clone(), 1, self.settle_for(queue, consumer));
            // A consumer that went away between retain and send just misses it.
            let _ = consumer.send(delivery);
        }
    }

    fn record(&self, queue: &str, update: impl FnOnce(&mut QueueStats)) {
        let mut state = self.lock();
        update(&mut state.queues.entry(queue.to_string()).or_default().stats);
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BrokerError> {
        let mut state = self.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }
        self.route(&mut state, queue, body);
        Ok(())
    }

    async fn subscribe(&self, queue: &str) -> Result<Subscription, BrokerError> {
        let mut state = self.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        let entry = state.queues.entry(queue.to_string()).or_default();
        for body in entry.backlog.drain(..) {
            let delivery = Delivery::new(queue, body, 1, self.settle_for(queue, &sender));
            let _ = sender.send(delivery);
        }
        entry.consumers.push(sender);
        debug!(queue, consumers = entry.consumers.len(), "Consumer bound");
        Ok(receiver)
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut state = self.lock();
        state.closed = true;
        for queue in state.queues.values_mut() {
            queue.consumers.clear();
        }
        Ok(())
    }
}

struct MemorySettle {
    broker: InMemoryBroker,
    queue: String,
    consumer: WeakUnboundedSender<Delivery>,
}

impl MemorySettle {
    /// Hands a message whose consumer stopped listening to another live
    /// consumer of the queue, or keeps it for the next subscriber.
    fn park(&self, body: Vec<u8>, attempt: u32) {
        let mut state = self.broker.lock();
        let entry = state.queues.entry(self.queue.clone()).or_default();
        entry.consumers.retain(|consumer| !consumer.is_closed());
        if let Some(other) = entry.consumers.first() {
            let settle = self.broker.settle_for(&self.queue, other);
            match other.send(Delivery::new(self.queue.clone(), body, attempt, settle)) {
                Ok(()) => return,
                Err(unsent) => entry.backlog.push_back(unsent.0.body),
            }
        } else {
            entry.backlog.push_back(body);
        }
        warn!(queue = %self.queue, "Consumer gone, requeued message parked");
    }
}

#[async_trait]
impl Settle for MemorySettle {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError> {
        self.broker.record(&self.queue, |stats| stats.acked += 1);
        Ok(())
    }

    async fn requeue(self: Box<Self>, body: Vec<u8>, attempt: u32) -> Result<(), BrokerError> {
        self.broker.record(&self.queue, |stats| stats.requeued += 1);
        let Some(consumer) = self.consumer.upgrade() else {
            self.park(body, attempt);
            return Ok(());
        };
        let settle = self.broker.settle_for(&self.queue, &consumer);
        if let Err(unsent) = consumer.send(Delivery::new(self.queue.clone(), body, attempt, settle)) {
            self.park(unsent.0.body, attempt);
        }
        Ok(())
    }

    async fn dead_letter(self: Box<Self>, body: Vec<u8>) -> Result<(), BrokerError> {
        let target = dead_letter_queue(&self.queue);
        let mut state = self.broker.lock();
        state
            .queues
            .entry(self.queue.clone())
            .or_default()
            .stats
            .dead_lettered += 1;
        self.broker.route(&mut state, &target, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_consumer_receives_a_copy() {
        let broker = InMemoryBroker::new();
        let mut first = broker.subscribe("q").await.unwrap();
        let mut second = broker.subscribe("q").await.unwrap();

        broker.publish("q", b"hello".to_vec()).await.unwrap();

        assert_eq!(first.recv().await.unwrap().body(), b"hello");
        assert_eq!(second.recv().await.unwrap().body(), b"hello");
        assert_eq!(broker.stats("q").published, 1);
    }

    #[tokio::test]
    async fn test_backlog_is_drained_by_first_subscriber() {
        let broker = InMemoryBroker::new();
        broker.publish("q", b"early".to_vec()).await.unwrap();
        assert_eq!(broker.backlog("q").len(), 1);

        let mut consumer = broker.subscribe("q").await.unwrap();
        let delivery = consumer.recv().await.unwrap();
        assert_eq!(delivery.body(), b"early");
        assert_eq!(delivery.attempt(), 1);
        assert!(broker.backlog("q").is_empty());
    }

    #[tokio::test]
    async fn test_requeue_redelivers_with_next_attempt() {
        let broker = InMemoryBroker::new();
        let mut consumer = broker.subscribe("q").await.unwrap();
        broker.publish("q", b"retry me".to_vec()).await.unwrap();

        let first = consumer.recv().await.unwrap();
        first.requeue().await.unwrap();

        let second = consumer.recv().await.unwrap();
        assert_eq!(second.attempt(), 2);
        second.ack().await.unwrap();

        let stats = broker.stats("q");
        assert_eq!((stats.requeued, stats.acked), (1, 1));
    }

    #[tokio::test]
    async fn test_requeue_after_consumer_stopped_parks_message() {
        let broker = InMemoryBroker::new();
        let mut consumer = broker.subscribe("q").await.unwrap();
        broker.publish("q", b"in flight".to_vec()).await.unwrap();

        let delivery = consumer.recv().await.unwrap();
        drop(consumer);
        delivery.requeue().await.unwrap();

        assert_eq!(broker.backlog("q"), vec![b"in flight".to_vec()]);
        let mut next = broker.subscribe("q").await.unwrap();
        assert_eq!(next.recv().await.unwrap().body(), b"in flight");
    }

    #[tokio::test]
    async fn test_dead_letter_moves_message_to_dlq() {
        let broker = InMemoryBroker::new();
        let mut consumer = broker.subscribe("q").await.unwrap();
        broker.publish("q", b"poison".to_vec()).await.unwrap();

        consumer.recv().await.unwrap().dead_letter().await.unwrap();

        assert_eq!(broker.stats("q").dead_lettered, 1);
        assert_eq!(broker.backlog("q.dead_letter"), vec![b"poison".to_vec()]);
    }

    #[tokio::test]
    async fn test_closed_broker_rejects_publish_and_ends_subscriptions() {
        let broker = InMemoryBroker::new();
        let mut consumer = broker.subscribe("q").await.unwrap();

        broker.close().await.unwrap();

        assert!(consumer.recv().await.is_none());
        assert!(matches!(
            broker.publish("q", vec![]).await,
            Err(BrokerError::Closed)
        ));
    }
}
