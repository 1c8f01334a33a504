use super::{AddItem, CartEngine};
use crate::broker::{EventHandler, HandlerError};
use crate::events::Event;
use async_trait::async_trait;
use tracing::info;

/// Turns `menu_item_selected` events into [`CartEngine::add_item`] calls.
pub struct MenuSelectionHandler {
    engine: CartEngine,
}

impl MenuSelectionHandler {
    pub fn new(engine: CartEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for MenuSelectionHandler {
    fn name(&self) -> &'static str {
        "menu_selection"
    }

    async fn handle(&self, event: Event) -> Result<(), HandlerError> {
        let selection = match event {
            Event::MenuItemSelected(selection) => selection,
            other => {
                return Err(HandlerError::Rejected(format!(
                    "unexpected {} event on the menu selection queue",
                    other.kind()
                )))
            }
        };
        let cart = self.engine.add_item(AddItem::from(selection)).await?;
        info!(
            customer_id = cart.customer_id,
            items = cart.items.len(),
            "Menu selection added to cart"
        );
        Ok(())
    }
}
