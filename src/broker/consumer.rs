//! Consumer loop: one per subscribed queue, one task per delivery.

use super::{Broker, BrokerError, Delivery};
use crate::events::{Decoded, Event};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// How a handler failed, which decides what happens to the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The message can never succeed; it is dead-lettered.
    #[error("message rejected: {0}")]
    Rejected(String),
    /// Worth another attempt; requeued until the redelivery budget runs out.
    #[error("transient failure: {0}")]
    Transient(String),
}

#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: Event) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ConsumerSettings {
    /// Requeues allowed after the first attempt before a message is dead-lettered.
    pub max_redeliveries: u32,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            max_redeliveries: 3,
        }
    }
}

enum Disposition {
    Ack,
    Requeue,
    DeadLetter,
}

async fn process(delivery: Delivery, handler: Arc<dyn EventHandler>, settings: ConsumerSettings) {
    let queue = delivery.queue().to_string();
    let attempt = delivery.attempt();
    let handler_name = handler.name();

    let disposition = match Event::decode(delivery.body()) {
        Err(e) => {
            warn!(%queue, handler = handler_name, error = %e, "Malformed message");
            Disposition::DeadLetter
        }
        Ok(Decoded::Unknown(kind)) => {
            debug!(%queue, handler = handler_name, %kind, "Skipping unknown event type");
            Disposition::Ack
        }
        Ok(Decoded::Known(event)) => match handler.handle(event).await {
            Ok(()) => Disposition::Ack,
            Err(HandlerError::Rejected(reason)) => {
                warn!(%queue, handler = handler_name, %reason, "Message rejected");
                Disposition::DeadLetter
            }
            Err(HandlerError::Transient(reason)) if attempt <= settings.max_redeliveries => {
                warn!(%queue, handler = handler_name, attempt, %reason, "Handler failed, requeueing");
                Disposition::Requeue
            }
            Err(HandlerError::Transient(reason)) => {
                error!(%queue, handler = handler_name, attempt, %reason, "Redeliveries exhausted");
                Disposition::DeadLetter
            }
        },
    };

    let settled = match disposition {
        Disposition::Ack => delivery.ack().await,
        Disposition::Requeue => delivery.requeue().await,
        Disposition::DeadLetter => delivery.dead_letter().await,
    };
    if let Err(e) = settled {
        error!(%queue, handler = handler_name, error = %e, "Failed to settle delivery");
    }
}

/// Runs until `shutdown` flips to `true` (or its sender is dropped) or the
/// subscription ends, then waits for in-flight handlers.
pub async fn consume(
    broker: Arc<dyn Broker>,
    queue: String,
    handler: Arc<dyn EventHandler>,
    settings: ConsumerSettings,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), BrokerError> {
    let mut subscription = broker.subscribe(&queue).await?;
    info!(%queue, handler = handler.name(), "Consumer started");

    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            delivery = subscription.recv() => match delivery {
                Some(delivery) => {
                    in_flight.spawn(process(delivery, handler.clone(), settings));
                }
                None => break,
            },
            Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = finished {
                    error!(%queue, error = %e, "Handler task panicked");
                }
            }
        }
    }

    // Nothing new arrives from here on; requeues from in-flight handlers
    // go back to the broker.
    subscription.close();
    while let Some(finished) = in_flight.join_next().await {
        if let Err(e) = finished {
            error!(%queue, error = %e, "Handler task panicked");
        }
    }

    let mut released = 0usize;
    while let Ok(delivery) = subscription.try_recv() {
        if let Err(e) = delivery.release().await {
            error!(%queue, error = %e, "Failed to hand back unprocessed delivery");
        }
        released += 1;
    }
    info!(%queue, handler = handler.name(), released, "Consumer stopped");
    Ok(())
}

/// Spawns [`consume`] and logs a subscription failure instead of returning it.
pub fn spawn_consumer(
    broker: Arc<dyn Broker>,
    queue: impl Into<String>,
    handler: Arc<dyn EventHandler>,
    settings: ConsumerSettings,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let queue = queue.into();
    tokio::spawn(async move {
        if let Err(e) = consume(broker, queue.clone(), handler, settings, shutdown).await {
            error!(%queue, error = %e, "Consumer failed");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{InMemoryBroker, QueueStats};
    use crate::events::{MenuItemSelection, MENU_ITEM_SELECTED_QUEUE};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails transiently `failures` times, then succeeds.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl EventHandler for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn handle(&self, _event: Event) -> Result<(), HandlerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(HandlerError::Transient("store timed out".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Rejecting;

    #[async_trait]
    impl EventHandler for Rejecting {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        async fn handle(&self, _event: Event) -> Result<(), HandlerError> {
            Err(HandlerError::Rejected("quantity must be positive".into()))
        }
    }

    /// Asks the consumer to stop on its first message, which then fails.
    struct StopsConsumer {
        stop: watch::Sender<bool>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl EventHandler for StopsConsumer {
        fn name(&self) -> &'static str {
            "stops_consumer"
        }

        async fn handle(&self, _event: Event) -> Result<(), HandlerError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                return Ok(());
            }
            let _ = self.stop.send(true);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(HandlerError::Transient("store timed out".into()))
        }
    }

    fn selection() -> Vec<u8> {
        Event::MenuItemSelected(MenuItemSelection {
            customer_id: 1,
            restaurant_id: 1,
            name: "Dumplings".into(),
            price: dec!(7.5),
            quantity: 1,
        })
        .encode()
        .unwrap()
    }

    async fn wait_for(broker: &InMemoryBroker, queue: &str, done: impl Fn(QueueStats) -> bool) {
        for _ in 0..200 {
            if done(broker.stats(queue)) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting on {queue}: {:?}", broker.stats(queue));
    }

    fn start(
        broker: &InMemoryBroker,
        handler: Arc<dyn EventHandler>,
        max_redeliveries: u32,
    ) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (stop, shutdown) = watch::channel(false);
        let handle = spawn_consumer(
            Arc::new(broker.clone()),
            MENU_ITEM_SELECTED_QUEUE,
            handler,
            ConsumerSettings { max_redeliveries },
            shutdown,
        );
        (stop, handle)
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried_then_acked() {
        let broker = InMemoryBroker::new();
        let handler = Arc::new(Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let (stop, handle) = start(&broker, handler.clone(), 3);

        broker
            .publish(MENU_ITEM_SELECTED_QUEUE, selection())
            .await
            .unwrap();
        wait_for(&broker, MENU_ITEM_SELECTED_QUEUE, |s| s.acked == 1).await;

        let stats = broker.stats(MENU_ITEM_SELECTED_QUEUE);
        assert_eq!(stats.requeued, 2);
        assert_eq!(stats.dead_lettered, 0);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);

        stop.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_exhausted_redeliveries_are_dead_lettered() {
        let broker = InMemoryBroker::new();
        let handler = Arc::new(Flaky {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let (stop, handle) = start(&broker, handler.clone(), 1);

        broker
            .publish(MENU_ITEM_SELECTED_QUEUE, selection())
            .await
            .unwrap();
        wait_for(&broker, MENU_ITEM_SELECTED_QUEUE, |s| s.dead_lettered == 1).await;

        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            broker.backlog("menu_item_selected_queue.dead_letter").len(),
            1
        );

        stop.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_and_malformed_messages_are_dead_lettered() {
        let broker = InMemoryBroker::new();
        let (stop, handle) = start(&broker, Arc::new(Rejecting), 3);

        broker
            .publish(MENU_ITEM_SELECTED_QUEUE, selection())
            .await
            .unwrap();
        broker
            .publish(MENU_ITEM_SELECTED_QUEUE, b"{oops".to_vec())
            .await
            .unwrap();
        wait_for(&broker, MENU_ITEM_SELECTED_QUEUE, |s| s.dead_lettered == 2).await;
        assert_eq!(broker.stats(MENU_ITEM_SELECTED_QUEUE).requeued, 0);

        stop.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_event_types_are_acked() {
        let broker = InMemoryBroker::new();
        let (stop, handle) = start(&broker, Arc::new(Rejecting), 3);

        broker
            .publish(
                MENU_ITEM_SELECTED_QUEUE,
                br#"{"type":"menu_item_retired","payload":{}}"#.to_vec(),
            )
            .await
            .unwrap();
        wait_for(&broker, MENU_ITEM_SELECTED_QUEUE, |s| s.acked == 1).await;
        assert_eq!(broker.stats(MENU_ITEM_SELECTED_QUEUE).dead_lettered, 0);

        stop.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_hands_back_unfinished_messages() {
        let broker = InMemoryBroker::new();
        for _ in 0..3 {
            broker.publish(MENU_ITEM_SELECTED_QUEUE, selection()).await.unwrap();
        }
        let (stop, shutdown) = watch::channel(false);
        let handler = Arc::new(StopsConsumer {
            stop,
            calls: AtomicU32::new(0),
        });

        consume(
            Arc::new(broker.clone()),
            MENU_ITEM_SELECTED_QUEUE.to_string(),
            handler,
            ConsumerSettings::default(),
            shutdown,
        )
        .await
        .unwrap();

        // The failed message and anything never started wait for the next consumer.
        let stats = broker.stats(MENU_ITEM_SELECTED_QUEUE);
        let parked = broker.backlog(MENU_ITEM_SELECTED_QUEUE).len() as u64;
        assert!(parked >= 1);
        assert_eq!(stats.acked + parked, 3);
        assert_eq!(stats.dead_lettered, 0);
    }
}
