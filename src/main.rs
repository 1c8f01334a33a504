use food_delivery::broker::{Broker, InMemoryBroker};
use food_delivery::cart_store::{CartStore, InMemoryCartStore};
use food_delivery::config::{BrokerBackend, CacheBackend, Config};
use food_delivery::lifecycle::{setup_tracing, DeliverySystem};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

async fn connect_store(config: &Config) -> Result<Arc<dyn CartStore>, Box<dyn Error>> {
    match config.cache.backend {
        CacheBackend::Memory => {
            let (store, _task) = InMemoryCartStore::spawn(config.actors.buffer_size);
            Ok(Arc::new(store))
        }
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let store = food_delivery::cart_store::redis::RedisCartStore::connect(&config.cache.url).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => Err("cache backend `redis` needs the `redis` feature".into()),
    }
}

async fn connect_broker(config: &Config) -> Result<Arc<dyn Broker>, Box<dyn Error>> {
    match config.broker.backend {
        BrokerBackend::Memory => Ok(Arc::new(InMemoryBroker::new())),
        #[cfg(feature = "amqp")]
        BrokerBackend::Amqp => {
            let broker = food_delivery::broker::amqp::AmqpBroker::connect(&config.broker.url).await?;
            Ok(Arc::new(broker))
        }
        #[cfg(not(feature = "amqp"))]
        BrokerBackend::Amqp => Err("broker backend `amqp` needs the `amqp` feature".into()),
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load(None)?;
    setup_tracing(&config.log_level);

    let store = connect_store(&config).await?;
    let broker = connect_broker(&config).await?;
    info!(cache = ?config.cache.backend, broker = ?config.broker.backend, "Backends connected");

    let system = DeliverySystem::start(&config, store, broker);
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received");
    system.shutdown().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Tracing may not be set up yet if configuration failed.
            error!(error = %e, "Fatal error");
            eprintln!("food-delivery: {e}");
            ExitCode::FAILURE
        }
    }
}
