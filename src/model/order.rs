use super::{BonusId, CustomerId, DeliveryAgentId, FeeId, RestaurantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

record_id!(Order, "order");

/// Payments are settled elsewhere; orders only keep the reference.
pub type PaymentId = u32;

/// Delivery progress of an order. `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    OnItsWay,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OnItsWay => "OnItsWay",
            Self::Delivered => "Delivered",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::OnItsWay => 1,
            Self::Delivered => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Delivered
    }

    /// Statuses only move forward. Re-applying the current status is allowed
    /// except on a delivered order.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order status: {0:?}")]
pub struct InvalidStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "OnItsWay" => Ok(Self::OnItsWay),
            "Delivered" => Ok(Self::Delivered),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub total_amount: Decimal,
    pub vat_amount: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub comment: String,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub delivery_agent_id: Option<DeliveryAgentId>,
    pub payment_id: Option<PaymentId>,
    pub bonus_id: Option<BonusId>,
    pub fee_id: Option<FeeId>,
}

/// Orders always start `Pending` with no agent, payment or bonus.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub total_amount: Decimal,
    pub vat_amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub comment: String,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub fee_id: FeeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::OnItsWay,
            OrderStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert_eq!(
            "Flying".parse::<OrderStatus>(),
            Err(InvalidStatus("Flying".into()))
        );
        assert!("pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_transitions_only_move_forward() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(OnItsWay));
        assert!(Pending.can_transition_to(Delivered));
        assert!(OnItsWay.can_transition_to(OnItsWay));
        assert!(!OnItsWay.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Delivered));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(OrderId(12).to_string(), "order_12");
    }
}
