use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

pub mod memory;
pub mod path;
pub mod push_id;
pub mod tree;

#[cfg(feature = "file-store")]
pub mod file_store;

pub use path::StorePath;

/// Real-time hierarchical key-value backend the sync engine writes to and listens on
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Starts listening on `path`; the subscription yields the current subtree first
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription>;

    /// Replaces whatever is stored at `path`; `null` removes it
    async fn set(&self, path: &StorePath, value: Value) -> Result<()>;

    /// Generates a fresh insertion-ordered child key below `path` without writing anything
    async fn push(&self, path: &StorePath) -> Result<StorePath>;

    /// Deletes the subtree at `path`
    async fn remove(&self, path: &StorePath) -> Result<()>;
}

/// A full point-in-time copy of one subtree
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: StorePath,
    value: Option<Value>,
}

impl Snapshot {
    pub fn new(path: StorePath, value: Option<Value>) -> Self {
        Self { path, value }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    /// Child entries of an object node; empty for scalars and missing nodes
    pub fn children(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.value
            .as_ref()
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter().map(|(key, value)| (key.as_str(), value)))
    }
}

type CancelHook = Box<dyn FnOnce() + Send>;

/// Cancels a [`Subscription`] from outside the task that consumes it
#[derive(Clone)]
pub struct SubscriptionHandle {
    hook: Arc<Mutex<Option<CancelHook>>>,
}

impl SubscriptionHandle {
    /// Detaches the listener from the store; calling it again does nothing
    pub fn unsubscribe(&self) {
        let hook = self
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub fn is_active(&self) -> bool {
        self.hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Stream of snapshots for one store path
///
/// Only the latest snapshot is retained: a consumer that falls behind skips
/// straight to the current state. Dropping the subscription unsubscribes.
pub struct Subscription {
    pending: Option<Snapshot>,
    receiver: watch::Receiver<Snapshot>,
    handle: SubscriptionHandle,
}

impl Subscription {
    /// Wraps a store-side channel; `on_cancel` runs exactly once when the subscription ends
    pub fn new(
        mut receiver: watch::Receiver<Snapshot>,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        let initial = receiver.borrow_and_update().clone();
        Self {
            pending: Some(initial),
            receiver,
            handle: SubscriptionHandle {
                hook: Arc::new(Mutex::new(Some(Box::new(on_cancel)))),
            },
        }
    }

    /// Waits for the next snapshot, `None` once unsubscribed or the store is gone
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.handle.is_active() {
            return None;
        }
        if let Some(initial) = self.pending.take() {
            return Some(initial);
        }
        self.receiver.changed().await.ok()?;
        if !self.handle.is_active() {
            return None;
        }
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn unsubscribe(&mut self) {
        self.pending = None;
        self.handle.unsubscribe();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}
