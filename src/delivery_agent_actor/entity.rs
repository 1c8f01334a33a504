//! [`ActorEntity`] implementation for [`DeliveryAgent`].

use super::actions::DeliveryAgentAction;
use super::error::DeliveryAgentError;
use crate::model::{DeliveryAgent, DeliveryAgentCreate, DeliveryAgentId, NoUpdate, MAX_RATING, MIN_RATING};
use async_trait::async_trait;
use resource_actor::ActorEntity;
use rust_decimal::Decimal;

#[async_trait]
impl ActorEntity for DeliveryAgent {
    type Id = DeliveryAgentId;
    type Create = DeliveryAgentCreate;
    type Update = NoUpdate;
    type Action = DeliveryAgentAction;
    type ActionResult = DeliveryAgent;
    type Context = ();
    type Error = DeliveryAgentError;

    fn from_create_params(
        id: DeliveryAgentId,
        params: DeliveryAgentCreate,
    ) -> Result<Self, DeliveryAgentError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(DeliveryAgentError::EmptyName);
        }
        Ok(Self::new(id, name))
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &()) -> Result<(), DeliveryAgentError> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: DeliveryAgentAction,
        _ctx: &(),
    ) -> Result<DeliveryAgent, DeliveryAgentError> {
        match action {
            DeliveryAgentAction::SetAvailability(available) => self.available = available,
            DeliveryAgentAction::RecordRating(rating) => {
                if rating < Decimal::from(MIN_RATING) || rating > Decimal::from(MAX_RATING) {
                    return Err(DeliveryAgentError::RatingOutOfRange(rating));
                }
                self.rating = Some(rating);
            }
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_name_rejected() {
        let result = DeliveryAgent::from_create_params(
            DeliveryAgentId(1),
            DeliveryAgentCreate { name: "  ".into() },
        );
        assert_eq!(result, Err(DeliveryAgentError::EmptyName));
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let mut agent = DeliveryAgent::new(DeliveryAgentId(1), "Mika");

        let rated = agent
            .handle_action(DeliveryAgentAction::RecordRating(dec!(4.5)), &())
            .await
            .unwrap();
        assert_eq!(rated.rating, Some(dec!(4.5)));

        let err = agent
            .handle_action(DeliveryAgentAction::RecordRating(dec!(6)), &())
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryAgentError::RatingOutOfRange(dec!(6)));
        assert_eq!(agent.rating, Some(dec!(4.5)));
    }
}
