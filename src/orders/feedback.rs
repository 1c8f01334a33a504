use super::{LifecycleError, OrderService};
use crate::model::{
    Bonus, DeliveryAgentId, FeedbackCreate, FeedbackId, OrderId, MAX_RATING, MIN_RATING,
};
use crate::pricing::{calculate_bonus, round_money};
use crate::records::RecordError;
use chrono::Timelike;
use resource_actor::ActorClient;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub order_id: OrderId,
    pub delivery_agent_id: DeliveryAgentId,
    pub rating: Option<u8>,
    pub comment: String,
}

/// What happened after a feedback record was stored.
///
/// The feedback itself is committed; the two follow-ups may fail on their own
/// and are reported here instead of failing the call.
#[derive(Debug)]
pub struct FeedbackOutcome {
    pub feedback_id: FeedbackId,
    pub bonus: Result<Bonus, LifecycleError>,
    pub agent_rating: Result<Decimal, LifecycleError>,
}

impl OrderService {
    #[instrument(skip(self, request), fields(order_id = %request.order_id, agent_id = %request.delivery_agent_id))]
    pub async fn record_feedback(
        &self,
        request: FeedbackRequest,
    ) -> Result<FeedbackOutcome, LifecycleError> {
        if let Some(rating) = request.rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(RecordError::InvalidRating(rating).into());
            }
        }
        self.repo.orders.fetch(request.order_id).await?;

        let feedback_id = self
            .repo
            .feedback
            .create(FeedbackCreate {
                order_id: request.order_id,
                delivery_agent_id: request.delivery_agent_id,
                delivery_agent_rating: request.rating,
                comment: request.comment,
            })
            .await?;
        info!(%feedback_id, rating = ?request.rating, "Feedback recorded");

        let bonus = self.award_bonus(request.order_id).await;
        if let Err(e) = &bonus {
            warn!(error = %e, "Bonus calculation failed");
        }

        let agent_rating = self.refresh_agent_rating(request.delivery_agent_id).await;
        match &agent_rating {
            Err(LifecycleError::NoRatingsFound(_)) => debug!("Agent has no ratings yet"),
            Err(e) => warn!(error = %e, "Agent rating update failed"),
            Ok(_) => {}
        }

        Ok(FeedbackOutcome {
            feedback_id,
            bonus,
            agent_rating,
        })
    }

    /// Computes the delivery bonus for an order from its fee, the most recent
    /// rated feedback and the hour it was placed, stores it and attaches it to
    /// the order.
    #[instrument(skip(self))]
    pub async fn award_bonus(&self, order_id: OrderId) -> Result<Bonus, LifecycleError> {
        let order = self.repo.orders.fetch(order_id).await?;
        let fee_id = order.fee_id.ok_or(LifecycleError::MissingFee(order_id))?;
        let fee = self.repo.fees.fetch(fee_id).await?;

        let rating = self
            .repo
            .feedback
            .for_order(order_id)
            .await?
            .iter()
            .rev()
            .find_map(|feedback| feedback.delivery_agent_rating);

        let quote = calculate_bonus(fee.amount, rating, order.timestamp.hour());
        let bonus_id = self.repo.bonuses.create(quote.to_create()).await?;
        self.repo.orders.attach_bonus(order_id, bonus_id).await?;
        info!(%bonus_id, total = %quote.total, "Bonus awarded");

        Ok(self.repo.bonuses.fetch(bonus_id).await?)
    }

    /// Sets the agent's rating to the mean of every rating they received.
    #[instrument(skip(self))]
    pub async fn refresh_agent_rating(
        &self,
        agent_id: DeliveryAgentId,
    ) -> Result<Decimal, LifecycleError> {
        let ratings: Vec<Decimal> = self
            .repo
            .feedback
            .find(move |feedback| feedback.delivery_agent_id == agent_id)
            .await?
            .into_iter()
            .filter_map(|feedback| feedback.delivery_agent_rating.map(Decimal::from))
            .collect();
        if ratings.is_empty() {
            return Err(LifecycleError::NoRatingsFound(agent_id));
        }

        let mean = round_money(ratings.iter().sum::<Decimal>() / Decimal::from(ratings.len()));
        self.repo.agents.record_rating(agent_id, mean).await?;
        info!(%agent_id, rating = %mean, count = ratings.len(), "Agent rating updated");
        Ok(mean)
    }
}
