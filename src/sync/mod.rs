pub mod engine;
pub mod snapshot;

pub use engine::{items_path, BoardSync};
pub use snapshot::items_from_snapshot;
