//! Plain data types shared by the cart, the order records and the events.
//!
//! Money is always [`rust_decimal::Decimal`]; on the wire it travels as a JSON
//! number.

/// Declares `<Record>Id`, a `u32` newtype minted by the record's actor.
macro_rules! record_id {
    ($record:ident, $prefix:literal) => {
        paste::paste! {
            #[doc = "Identifier of a [`" $record "`], displayed as `" $prefix "_<n>`."]
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
                serde::Serialize, serde::Deserialize,
            )]
            #[serde(transparent)]
            pub struct [<$record Id>](pub u32);

            impl From<u32> for [<$record Id>] {
                fn from(id: u32) -> Self {
                    Self(id)
                }
            }

            impl std::fmt::Display for [<$record Id>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!($prefix, "_{}"), self.0)
                }
            }
        }
    };
}

pub mod bonus;
pub mod cart;
pub mod delivery_agent;
pub mod fee;
pub mod feedback;
pub mod order;
pub mod order_item;

pub use bonus::*;
pub use cart::*;
pub use delivery_agent::*;
pub use fee::*;
pub use feedback::*;
pub use order::*;
pub use order_item::*;

/// Update type for records that only change through actions or never change.
#[derive(Debug, Clone, Copy)]
pub enum NoUpdate {}

/// Action type for records with no custom actions.
#[derive(Debug, Clone, Copy)]
pub enum NoAction {}
