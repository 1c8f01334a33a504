use super::CartError;
use crate::broker::EventPublisher;
use crate::cart_store::{cart_key, CartStore, StoreError};
use crate::events::{Event, MenuItemSelection, PublishedCart, CART_UPDATED_QUEUE, ORDER_CREATED_QUEUE};
use crate::model::{Cart, CustomerId, RestaurantId, DEFAULT_VAT_RATE};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct CartSettings {
    pub vat_rate: Decimal,
    /// Upper bound for each individual store call.
    pub store_timeout: Duration,
    /// Publish a `cart_updated` event after every committed change.
    pub publish_updates: bool,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            vat_rate: DEFAULT_VAT_RATE,
            store_timeout: Duration::from_secs(2),
            publish_updates: false,
        }
    }
}

/// A request to put `quantity` of a dish into a customer's cart.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl From<MenuItemSelection> for AddItem {
    fn from(selection: MenuItemSelection) -> Self {
        Self {
            customer_id: selection.customer_id,
            restaurant_id: selection.restaurant_id,
            name: selection.name,
            price: selection.price,
            quantity: selection.quantity,
        }
    }
}

#[derive(Clone)]
pub struct CartEngine {
    store: Arc<dyn CartStore>,
    publisher: EventPublisher,
    settings: CartSettings,
}

impl CartEngine {
    pub fn new(store: Arc<dyn CartStore>, publisher: EventPublisher, settings: CartSettings) -> Self {
        Self {
            store,
            publisher,
            settings,
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CartError> {
        let limit = self.settings.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(limit).into()),
        }
    }

    async fn load(&self, customer_id: CustomerId) -> Result<Option<Cart>, CartError> {
        let key = cart_key(customer_id);
        match self.bounded(self.store.get(&key)).await? {
            Some(stored) => serde_json::from_str(&stored.value)
                .map(Some)
                .map_err(CartError::Corrupt),
            None => Ok(None),
        }
    }

    /// Optimistic read-modify-write of one cart.
    ///
    /// `apply` sees the current cart (`None` if there is none) and returns the
    /// cart to store. It runs again on fresh state whenever another writer got
    /// in first. Totals are recomputed before every write.
    async fn transact<F>(&self, customer_id: CustomerId, mut apply: F) -> Result<Cart, CartError>
    where
        F: FnMut(Option<Cart>) -> Result<Cart, CartError>,
    {
        let key = cart_key(customer_id);
        let mut attempt: u64 = 1;
        loop {
            let current = self.bounded(self.store.get(&key)).await?;
            let (cart, revision) = match current {
                Some(stored) => {
                    let cart = serde_json::from_str(&stored.value).map_err(CartError::Corrupt)?;
                    (Some(cart), Some(stored.revision))
                }
                None => (None, None),
            };

            let mut updated = apply(cart)?;
            updated.recalculate(self.settings.vat_rate);
            let body = serde_json::to_string(&updated).map_err(CartError::Encode)?;

            if self
                .bounded(self.store.compare_and_swap(&key, revision.as_ref(), body))
                .await?
            {
                if attempt > 1 {
                    debug!(customer_id, attempt, "Cart write committed after retries");
                }
                self.notify_updated(&updated).await;
                return Ok(updated);
            }

            debug!(customer_id, attempt, "Cart changed concurrently, retrying");
            attempt += 1;
            tokio::task::yield_now().await;
        }
    }

    async fn notify_updated(&self, cart: &Cart) {
        if !self.settings.publish_updates {
            return;
        }
        let event = Event::CartUpdated(cart.clone());
        if let Err(e) = self.publisher.publish(CART_UPDATED_QUEUE, &event).await {
            warn!(customer_id = cart.customer_id, error = %e, "Failed to publish cart update");
        }
    }

    #[instrument(skip(self, item), fields(customer_id = item.customer_id, restaurant_id = item.restaurant_id))]
    pub async fn add_item(&self, item: AddItem) -> Result<Cart, CartError> {
        if item.quantity <= 0 {
            return Err(CartError::InvalidQuantity(item.quantity));
        }
        if item.price < Decimal::ZERO {
            return Err(CartError::InvalidPrice(item.price));
        }
        let quantity =
            u32::try_from(item.quantity).map_err(|_| CartError::InvalidQuantity(item.quantity))?;

        let cart = self
            .transact(item.customer_id, |current| {
                let mut cart = match current {
                    Some(cart) if cart.restaurant_id != item.restaurant_id => {
                        return Err(CartError::RestaurantMismatch {
                            customer_id: item.customer_id,
                            cart_restaurant: cart.restaurant_id,
                            requested: item.restaurant_id,
                        });
                    }
                    Some(cart) => cart,
                    None => Cart::new(item.customer_id, item.restaurant_id),
                };
                cart.push_item(item.name.clone(), item.price, quantity);
                Ok(cart)
            })
            .await?;

        info!(items = cart.items.len(), total = %cart.total_amount, "Item added to cart");
        Ok(cart)
    }

    /// Sets a line's quantity; 0 removes the line.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        customer_id: CustomerId,
        item_id: u32,
        new_quantity: i64,
    ) -> Result<Cart, CartError> {
        if new_quantity < 0 {
            return Err(CartError::NegativeQuantity(new_quantity));
        }
        let quantity =
            u32::try_from(new_quantity).map_err(|_| CartError::InvalidQuantity(new_quantity))?;

        let cart = self
            .transact(customer_id, |current| {
                let mut cart = current.ok_or(CartError::CartNotFound(customer_id))?;
                if !cart.set_quantity(item_id, quantity) {
                    return Err(CartError::ItemNotFound {
                        customer_id,
                        item_id,
                    });
                }
                Ok(cart)
            })
            .await?;

        info!(items = cart.items.len(), total = %cart.total_amount, "Cart quantity updated");
        Ok(cart)
    }

    #[instrument(skip(self))]
    pub async fn view_cart(&self, customer_id: CustomerId) -> Result<Cart, CartError> {
        self.load(customer_id)
            .await?
            .ok_or(CartError::CartNotFound(customer_id))
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self, customer_id: CustomerId) -> Result<(), CartError> {
        let removed = self.bounded(self.store.delete(&cart_key(customer_id))).await?;
        if removed == 0 {
            return Err(CartError::CartNotFound(customer_id));
        }
        info!("Cart cleared");
        Ok(())
    }

    /// Deletes the customer's cart if it still holds what `snapshot` was taken
    /// from. A cart changed since then is kept and `Ok(false)` returned; that
    /// covers items added after publishing and a fresh cart started after an
    /// earlier release of the same snapshot.
    #[instrument(skip(self, snapshot), fields(customer_id = snapshot.customer_id))]
    pub async fn release_cart(&self, snapshot: &PublishedCart) -> Result<bool, CartError> {
        let key = cart_key(snapshot.customer_id);
        loop {
            let stored = match self.bounded(self.store.get(&key)).await? {
                Some(stored) => stored,
                None => return Err(CartError::CartNotFound(snapshot.customer_id)),
            };
            let cart: Cart = serde_json::from_str(&stored.value).map_err(CartError::Corrupt)?;
            if !snapshot.describes(&cart) {
                debug!("Cart changed since it was published, keeping it");
                return Ok(false);
            }
            if self
                .bounded(self.store.compare_and_delete(&key, &stored.revision))
                .await?
            {
                info!("Published cart released");
                return Ok(true);
            }
            debug!("Cart changed during release, re-reading");
            tokio::task::yield_now().await;
        }
    }

    /// Places the customer's current cart on the order queue.
    #[instrument(skip(self, comment))]
    pub async fn publish_cart(
        &self,
        customer_id: CustomerId,
        comment: impl Into<String>,
    ) -> Result<PublishedCart, CartError> {
        let cart = self.view_cart(customer_id).await?;
        let published = PublishedCart::from_cart(cart, comment);
        self.publisher
            .publish(ORDER_CREATED_QUEUE, &Event::OrderCreated(published.clone()))
            .await?;
        info!(
            items = published.items.len(),
            total = %published.total_amount,
            "Cart published for ordering"
        );
        Ok(published)
    }
}
