use super::{Broker, BrokerError};
use crate::events::Event;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Encodes [`Event`]s and publishes them with a bounded wait.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn Broker>,
    timeout: Duration,
}

impl EventPublisher {
    pub fn new(broker: Arc<dyn Broker>, timeout: Duration) -> Self {
        Self { broker, timeout }
    }

    #[instrument(skip(self, event), fields(kind = event.kind()))]
    pub async fn publish(&self, queue: &str, event: &Event) -> Result<(), BrokerError> {
        let body = event.encode()?;
        tokio::time::timeout(self.timeout, self.broker.publish(queue, body))
            .await
            .map_err(|_| BrokerError::Timeout(self.timeout))??;
        debug!(queue, "Event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{InMemoryBroker, Subscription};
    use crate::cart::CartError;
    use crate::events::ORDER_CREATED_QUEUE;
    use crate::model::Cart;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Unresponsive {
        publishes: AtomicU32,
    }

    #[async_trait]
    impl Broker for Unresponsive {
        async fn publish(&self, _queue: &str, _body: Vec<u8>) -> Result<(), BrokerError> {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn subscribe(&self, _queue: &str) -> Result<Subscription, BrokerError> {
            Err(BrokerError::Closed)
        }

        async fn close(&self) -> Result<(), BrokerError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publish_times_out_once() {
        let broker = Arc::new(Unresponsive::default());
        let publisher = EventPublisher::new(broker.clone(), Duration::from_millis(20));

        let err = publisher
            .publish(ORDER_CREATED_QUEUE, &Event::CartUpdated(Cart::new(1, 1)))
            .await
            .unwrap_err();

        assert!(matches!(err, BrokerError::Timeout(_)));
        assert_eq!(broker.publishes.load(Ordering::SeqCst), 1);
        let cart_err = CartError::from(err);
        assert!(!cart_err.is_rejection());
    }

    #[tokio::test]
    async fn test_publish_reaches_queue() {
        let broker = InMemoryBroker::new();
        let publisher = EventPublisher::new(Arc::new(broker.clone()), Duration::from_secs(1));

        publisher
            .publish(ORDER_CREATED_QUEUE, &Event::CartUpdated(Cart::new(1, 1)))
            .await
            .unwrap();

        assert_eq!(broker.backlog(ORDER_CREATED_QUEUE).len(), 1);
    }
}
