use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Customers and restaurants belong to other services; only their ids are seen here.
pub type CustomerId = u32;
pub type RestaurantId = u32;

/// VAT charged on top of the cart total unless configured otherwise.
pub const DEFAULT_VAT_RATE: Decimal = dec!(0.20);

/// A customer's in-progress selection, stored as JSON under `cart:{customerId}`.
///
/// Field names are camelCase on the wire; the snake_case spellings used by
/// older producers are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(alias = "customer_id")]
    pub customer_id: CustomerId,
    #[serde(alias = "restaurant_id")]
    pub restaurant_id: RestaurantId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float", alias = "total_amount")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", alias = "vat_amount")]
    pub vat_amount: Decimal,
    /// Next line-item id; absent in carts written before it was tracked.
    #[serde(default, alias = "next_item_id")]
    next_item_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Cart {
    pub fn new(customer_id: CustomerId, restaurant_id: RestaurantId) -> Self {
        Self {
            customer_id,
            restaurant_id,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            next_item_id: 1,
        }
    }

    fn next_id(&self) -> u32 {
        if self.next_item_id > 0 {
            self.next_item_id
        } else {
            self.items.iter().map(|item| item.id).max().unwrap_or(0) + 1
        }
    }

    /// Appends a line and returns its id. Ids are never reused within a cart.
    pub fn push_item(&mut self, name: impl Into<String>, price: Decimal, quantity: u32) -> u32 {
        let id = self.next_id();
        self.next_item_id = id + 1;
        self.items.push(CartItem {
            id,
            name: name.into(),
            price,
            quantity,
        });
        id
    }

    pub fn item(&self, item_id: u32) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Sets a line's quantity, removing the line when `quantity` is 0.
    /// Returns `false` when no line has `item_id`.
    pub fn set_quantity(&mut self, item_id: u32, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == item_id) else {
            return false;
        };
        if quantity == 0 {
            // Pin the counter before the line disappears so the id is not handed out again.
            self.next_item_id = self.next_id();
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity;
        }
        true
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Recomputes `total_amount` and `vat_amount` from the lines. VAT is
    /// rounded to cents.
    pub fn recalculate(&mut self, vat_rate: Decimal) {
        self.total_amount = self.subtotal();
        self.vat_amount = (self.total_amount * vat_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    }
}
