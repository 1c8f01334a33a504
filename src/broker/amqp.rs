//! RabbitMQ backend.
//!
//! Queues are published to through the default exchange, so a queue name is
//! also its routing key. Each queue is declared with a dead-letter route to
//! `{queue}.dead_letter`; rejecting a delivery without requeue moves it there.
//! Requeues are re-published with an incremented `x-attempt` header and the
//! original delivery is acked.

use super::{Broker, BrokerError, Delivery, Settle, Subscription};
use crate::events::dead_letter_queue;
use async_trait::async_trait;
use futures::StreamExt;
use lapin::acker::Acker;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicRejectOptions,
    QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable, LongString, ShortString};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

const ATTEMPT_HEADER: &str = "x-attempt";
const CONSUMER_TAG: &str = "food-delivery";

pub struct AmqpBroker {
    connection: Connection,
    channel: Channel,
    declared: Mutex<HashSet<String>>,
}

impl AmqpBroker {
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| BrokerError::Connection(format!("Failed to connect: {e}")))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BrokerError::Connection(format!("Failed to create channel: {e}")))?;
        info!("Connected to AMQP broker");
        Ok(Self {
            connection,
            channel,
            declared: Mutex::new(HashSet::new()),
        })
    }

    async fn declare(&self, queue: &str) -> Result<(), BrokerError> {
        let mut declared = self.declared.lock().await;
        if declared.contains(queue) {
            return Ok(());
        }

        let durable = QueueDeclareOptions {
            durable: true,
            ..Default::default()
        };
        let dead_letter = dead_letter_queue(queue);
        self.channel
            .queue_declare(&dead_letter, durable, FieldTable::default())
            .await
            .map_err(|e| BrokerError::Subscribe(format!("Failed to declare {dead_letter}: {e}")))?;

        let mut arguments = FieldTable::default();
        arguments.insert(
            ShortString::from("x-dead-letter-exchange"),
            AMQPValue::LongString(LongString::from("")),
        );
        arguments.insert(
            ShortString::from("x-dead-letter-routing-key"),
            AMQPValue::LongString(LongString::from(dead_letter.as_str())),
        );
        self.channel
            .queue_declare(queue, durable, arguments)
            .await
            .map_err(|e| BrokerError::Subscribe(format!("Failed to declare {queue}: {e}")))?;

        debug!(queue, "Declared queue");
        declared.insert(queue.to_string());
        Ok(())
    }
}

async fn publish_on(
    channel: &Channel,
    queue: &str,
    body: &[u8],
    attempt: u32,
) -> Result<(), BrokerError> {
    let mut headers = FieldTable::default();
    headers.insert(ShortString::from(ATTEMPT_HEADER), AMQPValue::LongUInt(attempt));
    let properties = BasicProperties::default()
        .with_content_type("application/json".into())
        .with_delivery_mode(2)
        .with_headers(headers);

    channel
        .basic_publish("", queue, BasicPublishOptions::default(), body, properties)
        .await
        .map_err(|e| BrokerError::Publish(e.to_string()))?
        .await
        .map_err(|e| BrokerError::Publish(format!("Publish not confirmed: {e}")))?;
    Ok(())
}

fn attempt_of(properties: &BasicProperties) -> u32 {
    properties
        .headers()
        .as_ref()
        .and_then(|headers| headers.inner().get(&ShortString::from(ATTEMPT_HEADER)).cloned())
        .and_then(|value| match value {
            AMQPValue::LongUInt(n) => Some(n),
            _ => None,
        })
        .unwrap_or(1)
}

#[async_trait]
impl Broker for AmqpBroker {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BrokerError> {
        self.declare(queue).await?;
        publish_on(&self.channel, queue, &body, 1).await
    }

    async fn subscribe(&self, queue: &str) -> Result<Subscription, BrokerError> {
        self.declare(queue).await?;
        let mut consumer = self
            .channel
            .basic_consume(
                queue,
                CONSUMER_TAG,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BrokerError::Subscribe(format!("Failed to start consumer: {e}")))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let channel = Arc::new(self.channel.clone());
        let queue = queue.to_string();
        tokio::spawn(async move {
            while let Some(next) = consumer.next().await {
                let delivery = match next {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        error!(%queue, error = %e, "Consumer stream error");
                        break;
                    }
                };
                let attempt = attempt_of(&delivery.properties);
                let settle = Box::new(AmqpSettle {
                    acker: delivery.acker,
                    channel: channel.clone(),
                    queue: queue.clone(),
                });
                if sender
                    .send(Delivery::new(queue.clone(), delivery.data, attempt, settle))
                    .is_err()
                {
                    break;
                }
            }
            warn!(%queue, "AMQP consumer stream ended");
        });
        Ok(receiver)
    }

    async fn close(&self) -> Result<(), BrokerError> {
        self.connection
            .close(200, "shutdown")
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))
    }
}

struct AmqpSettle {
    acker: Acker,
    channel: Arc<Channel>,
    queue: String,
}

#[async_trait]
impl Settle for AmqpSettle {
    async fn ack(self: Box<Self>) -> Result<(), BrokerError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| BrokerError::Settle(e.to_string()))
    }

    async fn requeue(self: Box<Self>, body: Vec<u8>, attempt: u32) -> Result<(), BrokerError> {
        publish_on(&self.channel, &self.queue, &body, attempt).await?;
        self.ack().await
    }

    async fn dead_letter(self: Box<Self>, _body: Vec<u8>) -> Result<(), BrokerError> {
        self.acker
            .reject(BasicRejectOptions { requeue: false })
            .await
            .map_err(|e| BrokerError::Settle(e.to_string()))
    }
}
