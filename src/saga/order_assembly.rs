use crate::broker::{EventHandler, HandlerError};
use crate::cart::{CartEngine, CartError};
use crate::events::{Event, PublishedCart};
use crate::model::{FeeId, OrderCreate, OrderId, OrderItemCreate, OrderItemId};
use crate::order_actor::OrderError;
use crate::pricing::calculate_fee;
use crate::records::RecordError;
use crate::repository::OrderRepository;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct SagaSettings {
    pub clear_cart_after_assembly: bool,
}

impl Default for SagaSettings {
    fn default() -> Self {
        Self {
            clear_cart_after_assembly: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SagaError {
    #[error("failed to create fee: {0}")]
    Fee(#[source] RecordError),

    #[error("failed to create order: {0}")]
    Order(#[source] OrderError),

    #[error("unexpected {0} event on the order queue")]
    UnexpectedEvent(&'static str),
}

impl From<SagaError> for HandlerError {
    fn from(e: SagaError) -> Self {
        match &e {
            SagaError::Fee(_) => HandlerError::Transient(e.to_string()),
            SagaError::Order(inner) if !inner.is_rejection() => {
                HandlerError::Transient(e.to_string())
            }
            SagaError::Order(_) | SagaError::UnexpectedEvent(_) => {
                HandlerError::Rejected(e.to_string())
            }
        }
    }
}

/// What one saga run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    pub order_id: OrderId,
    pub fee_id: FeeId,
    pub created_items: Vec<OrderItemId>,
    /// Names of cart lines that could not be written.
    pub skipped_items: Vec<String>,
    pub cart_released: bool,
}

pub struct OrderAssemblySaga {
    repo: OrderRepository,
    cart: CartEngine,
    settings: SagaSettings,
}

impl OrderAssemblySaga {
    pub fn new(repo: OrderRepository, cart: CartEngine, settings: SagaSettings) -> Self {
        Self {
            repo,
            cart,
            settings,
        }
    }

    #[instrument(skip(self, cart), fields(customer_id = cart.customer_id, items = cart.items.len()))]
    pub async fn assemble(&self, cart: PublishedCart) -> Result<AssemblyReport, SagaError> {
        let quote = calculate_fee(cart.amount_excluding_vat());
        let fee_id = self
            .repo
            .fees
            .create(quote.to_create())
            .await
            .map_err(SagaError::Fee)?;
        debug!(%fee_id, amount = %quote.amount, "Fee stored");

        let order_id = self
            .repo
            .orders
            .create_order(OrderCreate {
                total_amount: cart.total_amount,
                vat_amount: cart.vat_amount,
                timestamp: Utc::now(),
                comment: cart.comment.clone(),
                customer_id: cart.customer_id,
                restaurant_id: cart.restaurant_id,
                fee_id,
            })
            .await
            .map_err(SagaError::Order)?;
        info!(%order_id, %fee_id, "Order created");

        let mut created_items = Vec::with_capacity(cart.items.len());
        let mut skipped_items = Vec::new();
        for item in &cart.items {
            let line = OrderItemCreate {
                order_id,
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
            };
            match self.repo.items.create(line).await {
                Ok(item_id) => created_items.push(item_id),
                Err(e) => {
                    warn!(%order_id, item = %item.name, error = %e, "Skipping order item");
                    skipped_items.push(item.name.clone());
                }
            }
        }

        let cart_released = self.release_cart(&cart).await;

        Ok(AssemblyReport {
            order_id,
            fee_id,
            created_items,
            skipped_items,
            cart_released,
        })
    }

    /// Clears the published cart unless the customer has changed it since.
    async fn release_cart(&self, snapshot: &PublishedCart) -> bool {
        if !self.settings.clear_cart_after_assembly {
            return false;
        }
        let customer_id = snapshot.customer_id;
        match self.cart.release_cart(snapshot).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(customer_id, "Cart changed after publishing, kept");
                false
            }
            Err(CartError::CartNotFound(_)) => {
                debug!(customer_id, "Cart already released");
                false
            }
            Err(e) => {
                warn!(customer_id, error = %e, "Failed to release cart");
                false
            }
        }
    }
}

#[async_trait]
impl EventHandler for OrderAssemblySaga {
    fn name(&self) -> &'static str {
        "order_assembly"
    }

    async fn handle(&self, event: Event) -> Result<(), HandlerError> {
        let cart = match event {
            Event::OrderCreated(cart) => cart,
            other => return Err(SagaError::UnexpectedEvent(other.kind()).into()),
        };
        let report = self.assemble(cart).await?;
        info!(
            order_id = %report.order_id,
            created = report.created_items.len(),
            skipped = report.skipped_items.len(),
            cart_released = report.cart_released,
            "Order assembled"
        );
        Ok(())
    }
}
