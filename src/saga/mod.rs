//! # Order Assembly Saga
//!
//! Turns a published cart into a persisted order. The steps run in a fixed
//! order and each one depends on the previous:
//!
//! 1. **Fee**: price the order (VAT excluded) and store the fee. Failure
//!    aborts the saga before any order exists.
//! 2. **Order**: create the `Pending` order pointing at the fee.
//! 3. **Items**: one line item per cart line. A failing line is logged and
//!    skipped; the others are still written.
//! 4. **ReleaseCart**: optionally clear the customer's cart. A cart that is
//!    already gone is fine; other failures are logged and leave the order in
//!    place.
//!
//! Duplicate `order_created` deliveries are not detected: each one produces
//! its own order.

pub mod order_assembly;

pub use order_assembly::{AssemblyReport, OrderAssemblySaga, SagaError, SagaSettings};
