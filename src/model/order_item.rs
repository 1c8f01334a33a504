use super::OrderId;
use rust_decimal::Decimal;

record_id!(OrderItem, "order_item");

/// One line of an order, copied from the cart line it was assembled from.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderItemCreate {
    pub order_id: OrderId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}
