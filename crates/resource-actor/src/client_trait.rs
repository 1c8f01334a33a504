//! # ActorClient Trait
//!
//! Domain clients wrap a [`ResourceClient`] and translate [`FrameworkError`]
//! into their own error type. Implementing this trait gives them `get`,
//! `find` and `delete` for free.

use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Shared read/delete surface of resource-specific clients.
///
/// ```rust
/// use resource_actor::{ActorClient, ActorEntity, FrameworkError, ResourceActor, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Courier { id: u32, zone: String }
/// #[derive(Debug)] struct CourierCreate { zone: String }
/// #[derive(Debug)] enum CourierUpdate {}
/// #[derive(Debug)] enum CourierAction {}
/// #[derive(Debug, thiserror::Error)]
/// #[error("{0}")]
/// struct CourierError(String);
///
/// impl From<String> for CourierError {
///     fn from(s: String) -> Self { CourierError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Courier {
///     type Id = u32;
///     type Create = CourierCreate;
///     type Update = CourierUpdate;
///     type Action = CourierAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = CourierError;
///
///     fn from_create_params(id: u32, params: CourierCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, zone: params.zone })
///     }
///     async fn on_update(&mut self, update: CourierUpdate, _: &()) -> Result<(), Self::Error> {
///         match update {}
///     }
///     async fn handle_action(&mut self, action: CourierAction, _: &()) -> Result<(), Self::Error> {
///         match action {}
///     }
/// }
///
/// struct CourierClient { inner: ResourceClient<Courier> }
///
/// #[async_trait]
/// impl ActorClient<Courier> for CourierClient {
///     type Error = CourierError;
///     fn inner(&self) -> &ResourceClient<Courier> { &self.inner }
///     fn map_error(e: FrameworkError) -> Self::Error { CourierError(e.to_string()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, inner) = ResourceActor::<Courier>::new(8);
///     tokio::spawn(actor.run(()));
///     let client = CourierClient { inner };
///
///     let id = client.inner().create(CourierCreate { zone: "north".into() }).await.unwrap();
///     let north = client.find(|c: &Courier| c.zone == "north").await.unwrap();
///     assert_eq!(north.len(), 1);
///     client.delete(id).await.unwrap();
///     assert!(client.get(id).await.unwrap().is_none());
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: From<String> + Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    fn map_error(e: FrameworkError) -> Self::Error;

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Entities accepted by `filter`, ordered by id.
    async fn find<F>(&self, filter: F) -> Result<Vec<T>, Self::Error>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.inner().find(filter).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
