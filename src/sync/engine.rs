use crate::{
    config::SyncConfig,
    domain::{
        board::{Board, BoardKey},
        item::{ClipboardItem, ItemId, ItemRecord},
    },
    error::{Result, SyncError},
    store::{RemoteStore, StorePath, Subscription, SubscriptionHandle},
    sync::snapshot::items_from_snapshot,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

const ITEMS_SEGMENT: &str = "items";
const CONTENT_FIELD: &str = "content";

/// Store path holding a board's items: `<root>/<boardKey>/items`
pub fn items_path(config: &SyncConfig, key: &BoardKey) -> Result<StorePath> {
    StorePath::root()
        .child(&config.root)?
        .child(key.as_str())?
        .child(ITEMS_SEGMENT)
}

/// Live, newest-first view of one board plus the writes that change it
///
/// The list is replaced wholesale whenever the store delivers a snapshot;
/// writes never touch it directly. An engine is bound to a single board for
/// its whole life: to show another board, connect a new engine.
pub struct BoardSync {
    key: BoardKey,
    store: Arc<dyn RemoteStore>,
    items_path: StorePath,
    shared: Arc<Shared>,
    subscription: SubscriptionHandle,
    listener: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    closed: Mutex<bool>,
    items: watch::Sender<Vec<ClipboardItem>>,
}

impl Shared {
    /// Replaces the list unless the engine was closed; returns whether it is still open
    fn publish(&self, items: Vec<ClipboardItem>) -> bool {
        let closed = lock(&self.closed);
        if *closed {
            return false;
        }
        self.items.send_replace(items);
        true
    }
}

impl BoardSync {
    /// Subscribes to `key`'s items and starts tracking them
    ///
    /// Returns once the initial snapshot has been applied, so `items()` is
    /// populated immediately. Must be called within a Tokio runtime.
    pub async fn connect(
        store: Arc<dyn RemoteStore>,
        key: BoardKey,
        config: &SyncConfig,
    ) -> Result<Self> {
        let items_path = items_path(config, &key)?;
        let mut subscription = store.subscribe(&items_path).await?;
        debug!(board = %key, path = %items_path, "subscribed to board");

        let initial = subscription
            .next()
            .await
            .map(|snapshot| items_from_snapshot(&snapshot))
            .unwrap_or_default();
        let (items, _) = watch::channel(initial);
        let shared = Arc::new(Shared {
            closed: Mutex::new(false),
            items,
        });

        let handle = subscription.handle();
        let listener = tokio::spawn(listen(subscription, Arc::clone(&shared), key.clone()));

        Ok(Self {
            key,
            store,
            items_path,
            shared,
            subscription: handle,
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Like [`BoardSync::connect`], validating a raw key first
    pub async fn connect_str(
        store: Arc<dyn RemoteStore>,
        key: &str,
        config: &SyncConfig,
    ) -> Result<Self> {
        let key: BoardKey = key.parse()?;
        Self::connect(store, key, config).await
    }

    pub fn key(&self) -> &BoardKey {
        &self.key
    }

    pub fn items_path(&self) -> &StorePath {
        &self.items_path
    }

    /// Current items, newest first
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.shared.items.borrow().clone()
    }

    pub fn board(&self) -> Board {
        Board {
            key: self.key.clone(),
            items: self.items(),
        }
    }

    /// Receiver notified every time a snapshot replaces the list
    pub fn watch(&self) -> watch::Receiver<Vec<ClipboardItem>> {
        self.shared.items.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *lock(&self.shared.closed)
    }

    /// Creates a new item; it shows up in `items()` once the store echoes it back
    pub async fn add(&self, content: impl Into<String>) -> Result<ItemId> {
        let record = ItemRecord::new(content.into());
        let result: Result<ItemId> = async {
            self.ensure_open()?;
            let item_path = self.store.push(&self.items_path).await?;
            let id = ItemId::from_path(&item_path)?;
            self.store
                .set(&item_path, serde_json::to_value(&record)?)
                .await?;
            Ok(id)
        }
        .await;
        self.report("add", result)
    }

    /// Overwrites an item's content, leaving its id and creation time alone
    ///
    /// The item is not checked for existence first.
    pub async fn update(&self, id: &ItemId, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let result: Result<()> = async {
            self.ensure_open()?;
            let path = self.item_path(id)?.child(CONTENT_FIELD)?;
            self.store.set(&path, Value::String(content)).await
        }
        .await;
        self.report("update", result)
    }

    pub async fn delete(&self, id: &ItemId) -> Result<()> {
        let result: Result<()> = async {
            self.ensure_open()?;
            self.store.remove(&self.item_path(id)?).await
        }
        .await;
        self.report("delete", result)
    }

    /// Removes every item of the board in a single store operation
    pub async fn clear_all(&self) -> Result<()> {
        let result: Result<()> = async {
            self.ensure_open()?;
            self.store.remove(&self.items_path).await
        }
        .await;
        self.report("clear", result)
    }

    /// Stops listening; no snapshot can change the list afterwards
    ///
    /// Safe to call more than once. Dropping the engine also closes it.
    pub fn close(&self) {
        {
            let mut closed = lock(&self.shared.closed);
            if *closed {
                return;
            }
            *closed = true;
        }

        self.subscription.unsubscribe();
        if let Some(listener) = lock(&self.listener).take() {
            listener.abort();
        }
        debug!(board = %self.key, "board sync closed");
    }

    fn item_path(&self, id: &ItemId) -> Result<StorePath> {
        self.items_path.child(id.as_str())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(SyncError::EngineClosed);
        }
        Ok(())
    }

    fn report<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(board = %self.key, operation, error = %err, "board write failed");
        }
        result
    }
}

impl Drop for BoardSync {
    fn drop(&mut self) {
        self.close();
    }
}

async fn listen(mut subscription: Subscription, shared: Arc<Shared>, key: BoardKey) {
    while let Some(snapshot) = subscription.next().await {
        let items = items_from_snapshot(&snapshot);
        debug!(board = %key, count = items.len(), "applied board snapshot");
        if !shared.publish(items) {
            break;
        }
    }
    subscription.unsubscribe();
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
