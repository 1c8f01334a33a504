//! Actor-backed in-memory [`CartStore`].
//!
//! The actor owns the map and answers one request at a time, which is what
//! makes `compare_and_swap` atomic. Revisions come from a counter, so a key
//! that is deleted and recreated never matches an older revision.

use super::{CartStore, Revision, StoreError, Versioned};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<T>;

enum StoreRequest {
    Get {
        key: String,
        respond_to: Reply<Option<Versioned>>,
    },
    CompareAndSwap {
        key: String,
        expected: Option<Revision>,
        value: String,
        respond_to: Reply<bool>,
    },
    Delete {
        key: String,
        respond_to: Reply<u64>,
    },
    CompareAndDelete {
        key: String,
        expected: Revision,
        respond_to: Reply<bool>,
    },
}

struct Entry {
    value: String,
    revision: u64,
}

pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    entries: HashMap<String, Entry>,
    next_revision: u64,
}

impl StoreActor {
    pub fn new(buffer_size: usize) -> (Self, InMemoryCartStore) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            entries: HashMap::new(),
            next_revision: 1,
        };
        (actor, InMemoryCartStore { sender })
    }

    fn matches(&self, key: &str, expected: Option<&Revision>) -> bool {
        match (self.entries.get(key), expected) {
            (None, None) => true,
            (Some(entry), Some(expected)) => entry.revision.to_string() == expected.as_str(),
            _ => false,
        }
    }

    pub async fn run(mut self) {
        info!("Cart store started");
        while let Some(request) = self.receiver.recv().await {
            match request {
                StoreRequest::Get { key, respond_to } => {
                    let found = self.entries.get(&key).map(|entry| Versioned {
                        value: entry.value.clone(),
                        revision: Revision::new(entry.revision.to_string()),
                    });
                    let _ = respond_to.send(found);
                }
                StoreRequest::CompareAndSwap {
                    key,
                    expected,
                    value,
                    respond_to,
                } => {
                    let swapped = self.matches(&key, expected.as_ref());
                    if swapped {
                        let revision = self.next_revision;
                        self.next_revision += 1;
                        self.entries.insert(key, Entry { value, revision });
                    } else {
                        debug!(%key, "Revision mismatch");
                    }
                    let _ = respond_to.send(swapped);
                }
                StoreRequest::Delete { key, respond_to } => {
                    let removed = u64::from(self.entries.remove(&key).is_some());
                    let _ = respond_to.send(removed);
                }
                StoreRequest::CompareAndDelete {
                    key,
                    expected,
                    respond_to,
                } => {
                    let removed = self.matches(&key, Some(&expected));
                    if removed {
                        self.entries.remove(&key);
                    }
                    let _ = respond_to.send(removed);
                }
            }
        }
        info!(keys = self.entries.len(), "Cart store stopped");
    }
}

/// Client half of [`StoreActor`]; cheap to clone.
#[derive(Clone)]
pub struct InMemoryCartStore {
    sender: mpsc::Sender<StoreRequest>,
}

impl InMemoryCartStore {
    /// Starts a store actor on the current runtime.
    pub fn spawn(buffer_size: usize) -> (Self, tokio::task::JoinHandle<()>) {
        let (actor, store) = StoreActor::new(buffer_size);
        (store, tokio::spawn(actor.run()))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        let key = key.to_string();
        self.request(|respond_to| StoreRequest::Get { key, respond_to })
            .await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Revision>,
        value: String,
    ) -> Result<bool, StoreError> {
        let key = key.to_string();
        let expected = expected.cloned();
        self.request(|respond_to| StoreRequest::CompareAndSwap {
            key,
            expected,
            value,
            respond_to,
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let key = key.to_string();
        self.request(|respond_to| StoreRequest::Delete { key, respond_to })
            .await
    }

    async fn compare_and_delete(&self, key: &str, expected: &Revision) -> Result<bool, StoreError> {
        let key = key.to_string();
        let expected = expected.clone();
        self.request(|respond_to| StoreRequest::CompareAndDelete {
            key,
            expected,
            respond_to,
        })
        .await
    }
}
