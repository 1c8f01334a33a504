use crate::broker::{spawn_consumer, Broker, BrokerError, ConsumerSettings, EventPublisher};
use crate::cart::{CartEngine, CartSettings, MenuSelectionHandler};
use crate::cart_store::CartStore;
use crate::config::Config;
use crate::events::{MENU_ITEM_SELECTED_QUEUE, ORDER_CREATED_QUEUE};
use crate::orders::OrderService;
use crate::repository::OrderRepository;
use crate::saga::{OrderAssemblySaga, SagaSettings};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("task failed during shutdown: {0}")]
    Task(#[from] JoinError),
    #[error("failed to close broker: {0}")]
    Broker(#[from] BrokerError),
}

/// The running service: record actors, cart engine, order services and one
/// consumer per inbound queue.
///
/// ```rust
/// use food_delivery::broker::InMemoryBroker;
/// use food_delivery::cart_store::InMemoryCartStore;
/// use food_delivery::config::Config;
/// use food_delivery::lifecycle::DeliverySystem;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let (store, _store_task) = InMemoryCartStore::spawn(8);
///     let system = DeliverySystem::start(
///         &Config::for_test(),
///         Arc::new(store),
///         Arc::new(InMemoryBroker::new()),
///     );
///
///     let agent = system.orders.create_delivery_agent("Ada").await.unwrap();
///     assert_eq!(agent.to_string(), "delivery_agent_1");
///
///     system.shutdown().await.unwrap();
/// }
/// ```
pub struct DeliverySystem {
    pub cart: CartEngine,
    pub orders: OrderService,
    pub publisher: EventPublisher,
    broker: Arc<dyn Broker>,
    shutdown: watch::Sender<bool>,
    consumers: Vec<JoinHandle<()>>,
    actors: Vec<JoinHandle<()>>,
}

impl DeliverySystem {
    /// Wires everything onto already connected backends. Must be called
    /// inside a Tokio runtime.
    pub fn start(config: &Config, store: Arc<dyn CartStore>, broker: Arc<dyn Broker>) -> Self {
        // 1. Record actors
        let (repository, actors) = OrderRepository::spawn(config.actors.buffer_size);

        // 2. Services
        let publisher = EventPublisher::new(broker.clone(), config.broker.timeout());
        let cart = CartEngine::new(
            store,
            publisher.clone(),
            CartSettings {
                vat_rate: config.cart.vat_rate,
                store_timeout: config.cache.timeout(),
                publish_updates: config.cart.publish_updates,
            },
        );
        let orders = OrderService::new(repository.clone());
        let saga = OrderAssemblySaga::new(
            repository,
            cart.clone(),
            SagaSettings {
                clear_cart_after_assembly: config.saga.clear_cart_after_assembly,
            },
        );

        // 3. Consumers
        let settings = ConsumerSettings {
            max_redeliveries: config.broker.max_redeliveries,
        };
        let (shutdown, signal) = watch::channel(false);
        let consumers = vec![
            spawn_consumer(
                broker.clone(),
                MENU_ITEM_SELECTED_QUEUE,
                Arc::new(MenuSelectionHandler::new(cart.clone())),
                settings,
                signal.clone(),
            ),
            spawn_consumer(
                broker.clone(),
                ORDER_CREATED_QUEUE,
                Arc::new(saga),
                settings,
                signal,
            ),
        ];
        info!(consumers = consumers.len(), "Delivery system started");

        Self {
            cart,
            orders,
            publisher,
            broker,
            shutdown,
            consumers,
            actors,
        }
    }

    /// Stops the consumers (letting in-flight messages finish), closes the
    /// broker and waits for every actor to drain.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        let Self {
            cart,
            orders,
            publisher,
            broker,
            shutdown,
            consumers,
            actors,
        } = self;
        info!("Shutting down system...");

        let _ = shutdown.send(true);
        for handle in consumers {
            handle.await?;
        }

        // The consumers held the other clones; these are the last ones.
        drop(cart);
        drop(orders);
        drop(publisher);
        if let Err(e) = broker.close().await {
            error!(error = %e, "Broker close failed");
            return Err(e.into());
        }

        for handle in actors {
            handle.await?;
        }
        info!("System shutdown complete.");
        Ok(())
    }
}
