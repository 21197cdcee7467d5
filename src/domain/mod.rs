pub mod board;
pub mod item;
pub mod sorting;

pub use board::{resolve_board_key, share_link, Board, BoardKey, KeyResolution};
pub use item::{ClipboardItem, ItemId, ItemRecord};
pub use sorting::{sort_items, sort_newest_first, SortField, SortOrder};
