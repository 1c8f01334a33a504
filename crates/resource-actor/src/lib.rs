//! # resource-actor
//!
//! Generic building blocks for keeping records behind actors: each record type
//! gets a [`ResourceActor`] that owns its store and processes requests one at a
//! time, and callers hold a cheap, cloneable [`ResourceClient`].
//!
//! The crate has three layers:
//!
//! 1. **Entity** ([`ActorEntity`]): the record type, its DTOs and its rules.
//! 2. **Runtime** ([`ResourceActor`]): the mailbox loop and the id counter.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed async calls.
//!
//! ## Example
//!
//! ```rust
//! use resource_actor::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Shift { id: u32, courier: String, closed: bool }
//!
//! #[derive(Debug)] struct ShiftCreate { courier: String }
//! #[derive(Debug)] enum ShiftUpdate {}
//! #[derive(Debug)] enum ShiftAction { Close }
//! #[derive(Debug, thiserror::Error)]
//! #[error("shift already closed")]
//! struct ShiftError;
//!
//! #[async_trait]
//! impl ActorEntity for Shift {
//!     type Id = u32;
//!     type Create = ShiftCreate;
//!     type Update = ShiftUpdate;
//!     type Action = ShiftAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = ShiftError;
//!
//!     fn from_create_params(id: u32, params: ShiftCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, courier: params.courier, closed: false })
//!     }
//!
//!     async fn on_update(&mut self, update: ShiftUpdate, _: &()) -> Result<(), Self::Error> {
//!         match update {}
//!     }
//!
//!     async fn handle_action(&mut self, action: ShiftAction, _: &()) -> Result<(), Self::Error> {
//!         match action {
//!             ShiftAction::Close if self.closed => Err(ShiftError),
//!             ShiftAction::Close => {
//!                 self.closed = true;
//!                 Ok(())
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Shift>::new(16);
//!     let handle = tokio::spawn(actor.run(()));
//!
//!     let id = client.create(ShiftCreate { courier: "Ada".into() }).await.unwrap();
//!     client.perform_action(id, ShiftAction::Close).await.unwrap();
//!     assert!(client.perform_action(id, ShiftAction::Close).await.is_err());
//!
//!     // Dropping the last client ends the actor loop.
//!     drop(client);
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Context injection
//!
//! Dependencies are passed to [`ResourceActor::run`] rather than to `new`, so
//! actors that need each other's clients can all be created first and wired
//! afterwards.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations, which
//! makes error paths easy to reach without a running actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
