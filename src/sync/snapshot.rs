use crate::{
    domain::{
        item::{ClipboardItem, ItemId, ItemRecord},
        sorting::sort_newest_first,
    },
    store::Snapshot,
};
use tracing::warn;

/// Rebuilds a board's item list from a full snapshot of its items subtree
///
/// A missing subtree, or one that is not an object, yields no items. Children
/// that are not well-formed records are skipped.
pub fn items_from_snapshot(snapshot: &Snapshot) -> Vec<ClipboardItem> {
    let Some(value) = snapshot.value() else {
        return Vec::new();
    };
    if !value.is_object() {
        warn!(path = %snapshot.path(), "items subtree is not an object, treating as empty");
        return Vec::new();
    }

    let mut items: Vec<ClipboardItem> = snapshot
        .children()
        .filter_map(|(key, child)| {
            let id = match key.parse::<ItemId>() {
                Ok(id) => id,
                Err(err) => {
                    warn!(
                        path = %snapshot.path(),
                        key,
                        error = %err,
                        "skipping item with invalid key"
                    );
                    return None;
                }
            };
            match serde_json::from_value::<ItemRecord>(child.clone()) {
                Ok(record) => Some(ClipboardItem::from_record(id, record)),
                Err(err) => {
                    warn!(path = %snapshot.path(), key, error = %err, "skipping malformed item");
                    None
                }
            }
        })
        .collect();

    sort_newest_first(&mut items);
    items
}
