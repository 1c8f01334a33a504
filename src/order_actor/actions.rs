//! Custom actions for the Order actor.

use crate::model::{BonusId, DeliveryAgentId, OrderStatus};

/// Every action answers with the order as it is after the action.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to a new status, forward only.
    ChangeStatus(OrderStatus),
    /// Binds an agent and changes the status in one step.
    AssignDeliveryAgent {
        agent_id: DeliveryAgentId,
        status: OrderStatus,
    },
    /// Points the order at its (latest) bonus record.
    AttachBonus(BonusId),
}
