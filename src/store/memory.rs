use crate::{
    error::{Result, SyncError},
    store::{
        path::StorePath, push_id::PushIdGenerator, tree, RemoteStore, Snapshot, Subscription,
    },
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::debug;

/// In-process real-time store
///
/// Cloning the handle shares the same tree, so several engines (or a test
/// acting as a second client) can observe each other's writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    root: Value,
    watchers: Vec<Watcher>,
    next_watcher: u64,
    push_ids: PushIdGenerator,
    read_only: bool,
}

struct Watcher {
    id: u64,
    path: StorePath,
    sender: watch::Sender<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `data` as its root
    pub fn with_data(data: Value) -> Self {
        let store = Self::default();
        store.lock().root = tree::normalize(data);
        store
    }

    /// Rejects every subsequent write with [`SyncError::PermissionDenied`] while enabled
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    /// Current value at `path`
    pub fn get(&self, path: &StorePath) -> Option<Value> {
        tree::get(&self.lock().root, path).cloned()
    }

    /// The whole tree, `{}` when empty
    pub fn export(&self) -> Value {
        let state = self.lock();
        if state.root.is_null() {
            Value::Object(Default::default())
        } else {
            state.root.clone()
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.watchers.retain(|w| !w.sender.is_closed());
        state.watchers.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.inner)
    }

    /// Whole tree as it would look after `apply`, without changing the store or notifying anyone
    ///
    /// Fails the same way the real write would, so a caller can stage the
    /// result somewhere else before committing it.
    pub(crate) fn preview(
        &self,
        path: &StorePath,
        apply: impl FnOnce(&mut Value) -> Result<()>,
    ) -> Result<Value> {
        let state = self.lock();
        check_writable(&state, path)?;

        let mut root = state.root.clone();
        apply(&mut root)?;
        Ok(if root.is_null() {
            Value::Object(Default::default())
        } else {
            root
        })
    }

    fn write(&self, path: &StorePath, apply: impl FnOnce(&mut Value) -> Result<()>) -> Result<()> {
        let mut state = self.lock();
        check_writable(&state, path)?;

        apply(&mut state.root)?;

        let State { root, watchers, .. } = &mut *state;
        watchers.retain(|w| !w.sender.is_closed());
        for watcher in watchers.iter().filter(|w| w.path.overlaps(path)) {
            let current = tree::get(root, &watcher.path).cloned();
            watcher.sender.send_if_modified(|snapshot| {
                if snapshot.value() == current.as_ref() {
                    return false;
                }
                *snapshot = Snapshot::new(watcher.path.clone(), current);
                true
            });
        }
        Ok(())
    }
}

fn check_writable(state: &State, path: &StorePath) -> Result<()> {
    if state.read_only {
        return Err(SyncError::PermissionDenied(path.to_string()));
    }
    Ok(())
}

fn lock_state(inner: &Inner) -> MutexGuard<'_, State> {
    inner.state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn detach(inner: &Weak<Inner>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        lock_state(&inner).watchers.retain(|w| w.id != id);
        debug!(watcher = id, "store subscription cancelled");
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription> {
        let mut state = self.lock();
        let id = state.next_watcher;
        state.next_watcher += 1;

        let snapshot = Snapshot::new(path.clone(), tree::get(&state.root, path).cloned());
        let (sender, receiver) = watch::channel(snapshot);
        state.watchers.push(Watcher {
            id,
            path: path.clone(),
            sender,
        });
        debug!(watcher = id, path = %path, "store subscription opened");

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(receiver, move || detach(&inner, id)))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.write(path, |root| tree::set(root, path, value))
    }

    async fn push(&self, path: &StorePath) -> Result<StorePath> {
        let id = self.lock().push_ids.next_id();
        path.child(&id)
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        self.write(path, |root| {
            tree::remove(root, path);
            Ok(())
        })
    }
}
