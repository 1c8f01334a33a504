use crate::model::{Cart, CartItem, CustomerId, RestaurantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `menu_item_selected` payload emitted by the restaurant catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemSelection {
    #[serde(alias = "customer_id")]
    pub customer_id: CustomerId,
    #[serde(alias = "restaurant_id")]
    pub restaurant_id: RestaurantId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Signed so that invalid quantities reach validation instead of failing to decode.
    pub quantity: i64,
}

/// `order_created` payload: the cart snapshot a customer asked to order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedCart {
    #[serde(alias = "customer_id")]
    pub customer_id: CustomerId,
    #[serde(alias = "restaurant_id")]
    pub restaurant_id: RestaurantId,
    #[serde(with = "rust_decimal::serde::float", alias = "total_amount")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", alias = "vat_amount")]
    pub vat_amount: Decimal,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl PublishedCart {
    pub fn from_cart(cart: Cart, comment: impl Into<String>) -> Self {
        Self {
            customer_id: cart.customer_id,
            restaurant_id: cart.restaurant_id,
            total_amount: cart.total_amount,
            vat_amount: cart.vat_amount,
            comment: comment.into(),
            items: cart.items,
        }
    }

    /// Whether `cart` still holds exactly what this snapshot was taken from.
    pub fn describes(&self, cart: &Cart) -> bool {
        cart.customer_id == self.customer_id
            && cart.restaurant_id == self.restaurant_id
            && cart.total_amount == self.total_amount
            && cart.items == self.items
    }

    pub fn amount_excluding_vat(&self) -> Decimal {
        self.total_amount - self.vat_amount
    }
}
