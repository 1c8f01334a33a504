//! # Order Repository
//!
//! The set of record clients the order services work with. [`OrderRepository::spawn`]
//! starts one actor per record type; tests build the struct from mock clients
//! instead.

use crate::clients::{
    BonusClient, DeliveryAgentClient, FeeClient, FeedbackClient, OrderClient, OrderItemClient,
};
use crate::model::{Bonus, Fee, Feedback, OrderItem};
use crate::{delivery_agent_actor, order_actor, records};
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Clone)]
pub struct OrderRepository {
    pub orders: OrderClient,
    pub items: OrderItemClient,
    pub fees: FeeClient,
    pub bonuses: BonusClient,
    pub feedback: FeedbackClient,
    pub agents: DeliveryAgentClient,
}

impl OrderRepository {
    /// Starts the record actors. They stop once every clone of the returned
    /// repository is dropped; await the handles to wait for that.
    pub fn spawn(buffer_size: usize) -> (Self, Vec<JoinHandle<()>>) {
        let (order_actor, orders) = order_actor::new(buffer_size);
        let (item_actor, items) = records::new::<OrderItem>(buffer_size);
        let (fee_actor, fees) = records::new::<Fee>(buffer_size);
        let (bonus_actor, bonuses) = records::new::<Bonus>(buffer_size);
        let (feedback_actor, feedback) = records::new::<Feedback>(buffer_size);
        let (agent_actor, agents) = delivery_agent_actor::new(buffer_size);

        // Items and feedback check their order through a clone of the order client.
        let handles = vec![
            tokio::spawn(order_actor.run(())),
            tokio::spawn(item_actor.run(orders.clone())),
            tokio::spawn(fee_actor.run(())),
            tokio::spawn(bonus_actor.run(())),
            tokio::spawn(feedback_actor.run(orders.clone())),
            tokio::spawn(agent_actor.run(())),
        ];
        info!(actors = handles.len(), "Record actors started");

        let repository = Self {
            orders: OrderClient::new(orders),
            items: OrderItemClient::new(items),
            fees: FeeClient::new(fees),
            bonuses: BonusClient::new(bonuses),
            feedback: FeedbackClient::new(feedback),
            agents: DeliveryAgentClient::new(agents),
        };
        (repository, handles)
    }
}
