//! # Entity Contract
//!
//! [`ActorEntity`] is the only trait an application implements to get a fully
//! working actor: the associated types describe the DTOs flowing through the
//! mailbox, and the async hooks carry the business rules.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// A record type managed by a [`ResourceActor`](crate::ResourceActor).
///
/// Ids are minted by the actor from a `u32` counter starting at 1, so `Id`
/// must be constructible from `u32`. They are kept ordered, which makes
/// [`ResourceClient::find`](crate::ResourceClient::find) results deterministic.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    type Id: Ord + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Parameters accepted by `create`.
    type Create: Send + Sync + Debug;

    /// Partial update accepted by `update`. Immutable records use an
    /// uninhabited enum here.
    type Update: Send + Sync + Debug;

    type Action: Send + Sync + Debug;

    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected when the actor is started with `run(context)`.
    type Context: Send + Sync;

    type Error: std::error::Error + Send + Sync + 'static;

    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies an update in place. Validate before mutating: the actor keeps
    /// whatever state the entity is left in.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
