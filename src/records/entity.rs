//! [`ActorEntity`] implementations for the write-once records.

use super::{OrderLookup, RecordError};
use crate::model::{
    Bonus, BonusCreate, BonusId, Fee, FeeCreate, FeeId, Feedback, FeedbackCreate, FeedbackId,
    NoAction, NoUpdate, OrderId, OrderItem, OrderItemCreate, OrderItemId, MAX_RATING, MIN_RATING,
};
use async_trait::async_trait;
use resource_actor::ActorEntity;
use rust_decimal::Decimal;

fn non_negative(amount: Decimal) -> Result<Decimal, RecordError> {
    if amount < Decimal::ZERO {
        return Err(RecordError::InvalidAmount(amount));
    }
    Ok(amount)
}

async fn ensure_order_exists(orders: &OrderLookup, order_id: OrderId) -> Result<(), RecordError> {
    match orders.get(order_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(RecordError::UnknownOrder(order_id)),
        Err(e) => Err(RecordError::OrderLookup(e.to_string())),
    }
}

#[async_trait]
impl ActorEntity for OrderItem {
    type Id = OrderItemId;
    type Create = OrderItemCreate;
    type Update = NoUpdate;
    type Action = NoAction;
    type ActionResult = ();
    type Context = OrderLookup;
    type Error = RecordError;

    fn from_create_params(id: OrderItemId, params: OrderItemCreate) -> Result<Self, RecordError> {
        if params.quantity == 0 {
            return Err(RecordError::InvalidQuantity(params.name));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            name: params.name,
            price: non_negative(params.price)?,
            quantity: params.quantity,
        })
    }

    async fn on_create(&mut self, orders: &OrderLookup) -> Result<(), RecordError> {
        ensure_order_exists(orders, self.order_id).await
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &OrderLookup) -> Result<(), RecordError> {
        match update {}
    }

    async fn handle_action(&mut self, action: NoAction, _ctx: &OrderLookup) -> Result<(), RecordError> {
        match action {}
    }
}

#[async_trait]
impl ActorEntity for Fee {
    type Id = FeeId;
    type Create = FeeCreate;
    type Update = NoUpdate;
    type Action = NoAction;
    type ActionResult = ();
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: FeeId, params: FeeCreate) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            percentage: non_negative(params.percentage)?,
            amount: non_negative(params.amount)?,
            description: params.description,
        })
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &()) -> Result<(), RecordError> {
        match update {}
    }

    async fn handle_action(&mut self, action: NoAction, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}

#[async_trait]
impl ActorEntity for Bonus {
    type Id = BonusId;
    type Create = BonusCreate;
    type Update = NoUpdate;
    type Action = NoAction;
    type ActionResult = ();
    type Context = ();
    type Error = RecordError;

    fn from_create_params(id: BonusId, params: BonusCreate) -> Result<Self, RecordError> {
        Ok(Self {
            id,
            percentage: non_negative(params.percentage)?,
            early_late_amount: non_negative(params.early_late_amount)?,
            amount: non_negative(params.amount)?,
            description: params.description,
        })
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &()) -> Result<(), RecordError> {
        match update {}
    }

    async fn handle_action(&mut self, action: NoAction, _ctx: &()) -> Result<(), RecordError> {
        match action {}
    }
}

#[async_trait]
impl ActorEntity for Feedback {
    type Id = FeedbackId;
    type Create = FeedbackCreate;
    type Update = NoUpdate;
    type Action = NoAction;
    type ActionResult = ();
    type Context = OrderLookup;
    type Error = RecordError;

    fn from_create_params(id: FeedbackId, params: FeedbackCreate) -> Result<Self, RecordError> {
        if let Some(rating) = params.delivery_agent_rating {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(RecordError::InvalidRating(rating));
            }
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            delivery_agent_id: params.delivery_agent_id,
            delivery_agent_rating: params.delivery_agent_rating,
            comment: params.comment,
        })
    }

    async fn on_create(&mut self, orders: &OrderLookup) -> Result<(), RecordError> {
        ensure_order_exists(orders, self.order_id).await
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &OrderLookup) -> Result<(), RecordError> {
        match update {}
    }

    async fn handle_action(&mut self, action: NoAction, _ctx: &OrderLookup) -> Result<(), RecordError> {
        match action {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryAgentId, Order, OrderCreate};
    use resource_actor::mock::MockClient;
    use resource_actor::FrameworkError;
    use rust_decimal_macros::dec;

    fn item(quantity: u32, price: Decimal) -> OrderItemCreate {
        OrderItemCreate {
            order_id: OrderId(1),
            name: "Gyoza".into(),
            price,
            quantity,
        }
    }

    fn order() -> Order {
        Order::from_create_params(
            OrderId(1),
            OrderCreate {
                total_amount: dec!(10),
                vat_amount: dec!(2),
                timestamp: chrono::Utc::now(),
                comment: String::new(),
                customer_id: 1,
                restaurant_id: 1,
                fee_id: FeeId(1),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_item_validation() {
        assert_eq!(
            OrderItem::from_create_params(OrderItemId(1), item(0, dec!(4))),
            Err(RecordError::InvalidQuantity("Gyoza".into()))
        );
        assert_eq!(
            OrderItem::from_create_params(OrderItemId(1), item(1, dec!(-4))),
            Err(RecordError::InvalidAmount(dec!(-4)))
        );
    }

    #[test]
    fn test_feedback_rating_range() {
        let feedback = |rating| FeedbackCreate {
            order_id: OrderId(1),
            delivery_agent_id: DeliveryAgentId(1),
            delivery_agent_rating: rating,
            comment: "ok".into(),
        };

        assert!(Feedback::from_create_params(FeedbackId(1), feedback(None)).is_ok());
        assert!(Feedback::from_create_params(FeedbackId(1), feedback(Some(5))).is_ok());
        assert_eq!(
            Feedback::from_create_params(FeedbackId(1), feedback(Some(0))),
            Err(RecordError::InvalidRating(0))
        );
        assert_eq!(
            Feedback::from_create_params(FeedbackId(1), feedback(Some(6))),
            Err(RecordError::InvalidRating(6))
        );
    }

    #[tokio::test]
    async fn test_item_requires_existing_order() {
        let mut orders = MockClient::<Order>::new();
        orders.expect_get(OrderId(1)).return_ok(Some(order()));
        orders.expect_get(OrderId(1)).return_ok(None);
        orders.expect_get(OrderId(1)).return_err(FrameworkError::ActorClosed);
        let lookup = orders.client();

        let mut line = OrderItem::from_create_params(OrderItemId(1), item(2, dec!(4))).unwrap();
        assert!(line.on_create(&lookup).await.is_ok());
        assert_eq!(
            line.on_create(&lookup).await,
            Err(RecordError::UnknownOrder(OrderId(1)))
        );
        let err = line.on_create(&lookup).await.unwrap_err();
        assert!(matches!(err, RecordError::OrderLookup(_)));
        assert!(!err.is_rejection());
        orders.verify();
    }
}
