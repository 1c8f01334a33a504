//! # Event Channel contract
//!
//! Every message on the channel is a JSON envelope `{"type": ..., "payload": ...}`.
//! Envelopes decode into the closed [`Event`] union; a `type` this build does
//! not know is reported as [`Decoded::Unknown`] so consumers can skip it.

mod payload;

pub use payload::{MenuItemSelection, PublishedCart};

use crate::model::Cart;
use serde::{Deserialize, Serialize};

pub const MENU_ITEM_SELECTED_QUEUE: &str = "menu_item_selected_queue";
pub const ORDER_CREATED_QUEUE: &str = "order_created_queue";
pub const CART_UPDATED_QUEUE: &str = "cart_updated_queue";

/// Poison messages for `queue` are moved here.
pub fn dead_letter_queue(queue: &str) -> String {
    format!("{queue}.dead_letter")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// A customer picked a dish in the restaurant catalogue.
    MenuItemSelected(MenuItemSelection),
    /// A cart was changed; carries the committed cart.
    CartUpdated(Cart),
    /// A customer published their cart for ordering.
    OrderCreated(PublishedCart),
}

const KNOWN_TYPES: [&str; 3] = ["menu_item_selected", "cart_updated", "order_created"];

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Known(Event),
    Unknown(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("envelope has no string \"type\" field")]
    MissingType,
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Event {
    /// The envelope `type` of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MenuItemSelected(_) => "menu_item_selected",
            Self::CartUpdated(_) => "cart_updated",
            Self::OrderCreated(_) => "order_created",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(EventError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Decoded, EventError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(EventError::Malformed)?;
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(EventError::MissingType)?;

        if !KNOWN_TYPES.contains(&kind) {
            return Ok(Decoded::Unknown(kind.to_string()));
        }
        serde_json::from_value(value)
            .map(Decoded::Known)
            .map_err(EventError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_menu_selection_envelope() {
        let event = Event::MenuItemSelected(MenuItemSelection {
            customer_id: 1,
            restaurant_id: 2,
            name: "Ramen".into(),
            price: dec!(11.5),
            quantity: 2,
        });

        let value: serde_json::Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "menu_item_selected");
        assert_eq!(value["payload"]["customerId"], 1);
        assert_eq!(value["payload"]["price"], 11.5);

        let decoded = Event::decode(&event.encode().unwrap()).unwrap();
        assert_eq!(decoded, Decoded::Known(event));
    }

    #[test]
    fn test_decodes_snake_case_order_payload() {
        let body = br#"{
            "type": "order_created",
            "payload": {
                "customer_id": 3,
                "restaurant_id": 8,
                "total_amount": 25.98,
                "vat_amount": 5.2,
                "comment": "ring twice",
                "items": [
                    {"id": 1, "name": "Burger", "price": 9.99, "quantity": 2},
                    {"id": 2, "name": "Fries", "price": 6.0, "quantity": 1}
                ]
            }
        }"#;

        let Decoded::Known(Event::OrderCreated(cart)) = Event::decode(body).unwrap() else {
            panic!("expected order_created");
        };
        assert_eq!(cart.customer_id, 3);
        assert_eq!(cart.total_amount, dec!(25.98));
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.comment, "ring twice");
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let body = br#"{"type": "restaurant_closed", "payload": {"id": 1}}"#;
        assert_eq!(
            Event::decode(body).unwrap(),
            Decoded::Unknown("restaurant_closed".into())
        );
    }

    #[test]
    fn test_known_type_with_bad_payload_is_malformed() {
        let body = br#"{"type": "menu_item_selected", "payload": {"name": 5}}"#;
        assert!(matches!(Event::decode(body), Err(EventError::Malformed(_))));
    }

    #[test]
    fn test_missing_type() {
        assert!(matches!(
            Event::decode(br#"{"payload": {}}"#),
            Err(EventError::MissingType)
        ));
        assert!(matches!(
            Event::decode(b"not json"),
            Err(EventError::Malformed(_))
        ));
    }
}
