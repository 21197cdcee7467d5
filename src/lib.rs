//! # SyncBoard Core
//!
//! Shared-clipboard synchronization for SyncBoard.
//!
//! A board is a list of text snippets stored under
//! `clipboards/<boardKey>/items` in a real-time key-value store. The
//! [`BoardSync`] engine keeps a newest-first view of one board in step with
//! the store and turns add/update/delete/clear calls into store writes.
//! Backends plug in through the [`RemoteStore`] trait.

pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::SyncConfig;
pub use domain::{
    board::{resolve_board_key, share_link, Board, BoardKey, KeyResolution},
    item::{ClipboardItem, ItemId},
};
pub use error::{Result, SyncError};
pub use store::{memory::MemoryStore, RemoteStore, Snapshot, StorePath, Subscription};
pub use sync::BoardSync;

#[cfg(feature = "file-store")]
pub use store::file_store::FileStore;
