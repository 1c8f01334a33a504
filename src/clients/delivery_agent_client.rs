//! # Delivery Agent Client

use crate::delivery_agent_actor::{DeliveryAgentAction, DeliveryAgentError};
use crate::model::{DeliveryAgent, DeliveryAgentCreate, DeliveryAgentId};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct DeliveryAgentClient {
    inner: ResourceClient<DeliveryAgent>,
}

impl DeliveryAgentClient {
    pub fn new(inner: ResourceClient<DeliveryAgent>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_agent(
        &self,
        name: &str,
    ) -> Result<DeliveryAgentId, DeliveryAgentError> {
        debug!("Sending request");
        self.inner
            .create(DeliveryAgentCreate {
                name: name.to_string(),
            })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, id: DeliveryAgentId) -> Result<DeliveryAgent, DeliveryAgentError> {
        self.get(id)
            .await?
            .ok_or_else(|| DeliveryAgentError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn set_availability(
        &self,
        id: DeliveryAgentId,
        available: bool,
    ) -> Result<DeliveryAgent, DeliveryAgentError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, DeliveryAgentAction::SetAvailability(available))
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn record_rating(
        &self,
        id: DeliveryAgentId,
        rating: Decimal,
    ) -> Result<DeliveryAgent, DeliveryAgentError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, DeliveryAgentAction::RecordRating(rating))
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<DeliveryAgent> for DeliveryAgentClient {
    type Error = DeliveryAgentError;

    fn inner(&self) -> &ResourceClient<DeliveryAgent> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        DeliveryAgentError::from(e)
    }
}
