//! # Record Client
//!
//! One client type serves all write-once records; the aliases below name the
//! instances the order services use.

use crate::model::{Bonus, Fee, Feedback, OrderId, OrderItem};
use crate::records::RecordError;
use async_trait::async_trait;
use resource_actor::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
use tracing::{debug, instrument};

pub type OrderItemClient = RecordClient<OrderItem>;
pub type FeeClient = RecordClient<Fee>;
pub type BonusClient = RecordClient<Bonus>;
pub type FeedbackClient = RecordClient<Feedback>;

#[derive(Clone)]
pub struct RecordClient<T: ActorEntity> {
    inner: ResourceClient<T>,
}

impl<T: ActorEntity> RecordClient<T> {
    pub fn new(inner: ResourceClient<T>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, params: T::Create) -> Result<T::Id, RecordError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Like `get`, but a missing record is an error.
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: T::Id) -> Result<T, RecordError> {
        let missing = id.to_string();
        self.get(id).await?.ok_or(RecordError::NotFound(missing))
    }
}

impl RecordClient<OrderItem> {
    /// Line items of `order_id`, in creation order.
    pub async fn for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RecordError> {
        self.find(move |item: &OrderItem| item.order_id == order_id)
            .await
    }
}

impl RecordClient<Feedback> {
    pub async fn for_order(&self, order_id: OrderId) -> Result<Vec<Feedback>, RecordError> {
        self.find(move |feedback: &Feedback| feedback.order_id == order_id)
            .await
    }
}

#[async_trait]
impl<T: ActorEntity> ActorClient<T> for RecordClient<T> {
    type Error = RecordError;

    fn inner(&self) -> &ResourceClient<T> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        RecordError::from(e)
    }
}
