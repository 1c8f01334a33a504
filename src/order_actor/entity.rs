//! [`ActorEntity`] implementation for [`Order`].

use super::actions::OrderAction;
use super::error::OrderError;
use crate::model::{NoUpdate, Order, OrderCreate, OrderId, OrderStatus};
use async_trait::async_trait;
use resource_actor::ActorEntity;
use rust_decimal::Decimal;

impl Order {
    fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = NoUpdate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.total_amount < Decimal::ZERO || params.vat_amount < Decimal::ZERO {
            return Err(OrderError::ValidationError(format!(
                "amounts must not be negative (total {}, vat {})",
                params.total_amount, params.vat_amount
            )));
        }
        Ok(Self {
            id,
            total_amount: params.total_amount,
            vat_amount: params.vat_amount,
            status: OrderStatus::Pending,
            timestamp: params.timestamp,
            comment: params.comment,
            customer_id: params.customer_id,
            restaurant_id: params.restaurant_id,
            delivery_agent_id: None,
            payment_id: None,
            bonus_id: None,
            fee_id: Some(params.fee_id),
        })
    }

    async fn on_update(&mut self, update: NoUpdate, _ctx: &()) -> Result<(), OrderError> {
        match update {}
    }

    /// Validation happens before any field is touched, so a rejected action
    /// leaves the order unchanged.
    async fn handle_action(&mut self, action: OrderAction, _ctx: &()) -> Result<Order, OrderError> {
        match action {
            OrderAction::ChangeStatus(status) => self.transition(status)?,
            OrderAction::AssignDeliveryAgent { agent_id, status } => {
                self.transition(status)?;
                self.delivery_agent_id = Some(agent_id);
            }
            OrderAction::AttachBonus(bonus_id) => self.bonus_id = Some(bonus_id),
        }
        Ok(self.clone())
    }
}
