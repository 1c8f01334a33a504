use super::{LifecycleError, OrderService};
use crate::delivery_agent_actor::DeliveryAgentError;
use crate::model::{
    DeliveryAgent, DeliveryAgentId, Order, OrderId, OrderItem, OrderStatus,
};
use crate::order_actor::OrderError;
use resource_actor::ActorClient;
use tracing::{info, instrument, warn};

/// Result of binding an agent to an order.
///
/// The order change is committed even when the agent's availability could not
/// be updated; `availability` carries that second step's result.
#[derive(Debug)]
pub struct AgentAssignment {
    pub order: Order,
    pub availability: Result<DeliveryAgent, DeliveryAgentError>,
}

impl AgentAssignment {
    pub fn is_complete(&self) -> bool {
        self.availability.is_ok()
    }
}

fn parse_status(status: &str) -> Result<OrderStatus, LifecycleError> {
    status
        .parse::<OrderStatus>()
        .map_err(|e| LifecycleError::Order(OrderError::from(e)))
}

impl OrderService {
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, LifecycleError> {
        Ok(self.repo.orders.fetch(order_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, LifecycleError> {
        self.repo.orders.fetch(order_id).await?;
        Ok(self.repo.items.for_order(order_id).await?)
    }

    /// Parses `status` and moves the order to it. An unknown status or a
    /// backward move leaves the order unchanged.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<Order, LifecycleError> {
        let status = parse_status(status)?;
        let order = self.repo.orders.change_status(order_id, status).await?;
        info!(%order_id, %status, "Order status updated");
        Ok(order)
    }

    /// Moves the order to `status` with `agent_id` bound to it, then marks the
    /// agent unavailable.
    #[instrument(skip(self))]
    pub async fn update_status_with_agent(
        &self,
        order_id: OrderId,
        status: &str,
        agent_id: DeliveryAgentId,
    ) -> Result<AgentAssignment, LifecycleError> {
        let status = parse_status(status)?;
        let order = self
            .repo
            .orders
            .assign_delivery_agent(order_id, agent_id, status)
            .await?;
        info!(%order_id, %agent_id, %status, "Delivery agent assigned");

        let availability = self.repo.agents.set_availability(agent_id, false).await;
        if let Err(e) = &availability {
            warn!(%order_id, %agent_id, error = %e, "Cannot update delivery agent availability");
        }
        Ok(AgentAssignment {
            order,
            availability,
        })
    }

    /// Deletes the order's line items, then the order. Returns how many items
    /// were removed.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<usize, LifecycleError> {
        self.repo.orders.fetch(order_id).await?;

        let items = self.repo.items.for_order(order_id).await?;
        for item in &items {
            self.repo.items.delete(item.id).await?;
        }
        self.repo.orders.delete(order_id).await?;
        info!(%order_id, items = items.len(), "Order deleted");
        Ok(items.len())
    }

    #[instrument(skip(self))]
    pub async fn create_delivery_agent(&self, name: &str) -> Result<DeliveryAgentId, LifecycleError> {
        let id = self.repo.agents.create_agent(name).await?;
        info!(agent_id = %id, "Delivery agent created");
        Ok(id)
    }
}
