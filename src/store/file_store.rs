use crate::{
    error::Result,
    store::{memory::MemoryStore, path::StorePath, tree, RemoteStore, Subscription},
};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// Real-time store whose tree is persisted to a JSON file on every write
///
/// A write reaches the file before subscribers see it: when the file cannot
/// be written, the write fails and the in-memory tree is left as it was.
pub struct FileStore {
    file_path: PathBuf,
    memory: MemoryStore,
    persist_lock: Mutex<()>,
}

impl FileStore {
    const DATA_FILE: &'static str = "syncboard.json";

    /// Opens the store backed by `file_path`, starting empty when the file does not exist
    pub async fn open(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        let memory = if file_path.exists() {
            let contents = fs::read_to_string(&file_path).await?;
            let data: Value = serde_json::from_str(&contents)?;
            MemoryStore::with_data(data)
        } else {
            MemoryStore::new()
        };

        Ok(Self {
            file_path,
            memory,
            persist_lock: Mutex::new(()),
        })
    }

    /// Opens the store using the default data file inside `dir`
    pub async fn open_in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(dir.as_ref().join(Self::DATA_FILE)).await
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The live in-memory tree behind this store
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn persist(&self, data: &Value) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            self.ensure_directory_exists(parent).await?;
        }

        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.file_path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FileStore {
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription> {
        self.memory.subscribe(path).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let staged = self
            .memory
            .preview(path, |root| tree::set(root, path, value.clone()))?;
        self.persist(&staged).await?;
        self.memory.set(path, value).await
    }

    async fn push(&self, path: &StorePath) -> Result<StorePath> {
        self.memory.push(path).await
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let staged = self.memory.preview(path, |root| {
            tree::remove(root, path);
            Ok(())
        })?;
        self.persist(&staged).await?;
        self.memory.remove(path).await
    }
}
