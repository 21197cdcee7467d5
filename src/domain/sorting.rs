use crate::domain::item::ClipboardItem;
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting clipboard items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Created,
    Content,
    Id,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SortField::Created),
            "content" => Ok(SortField::Content),
            "id" => Ok(SortField::Id),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: created, content, id",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!("Invalid sort order '{}'. Valid orders: asc, desc", s)),
        }
    }
}

/// Sorts clipboard items in-place
///
/// Ties on the chosen field fall back to the item id in the same direction.
/// Push ids grow with insertion, so under `Created`/`Descending` an item
/// added later in the same millisecond still comes first.
///
/// # Examples
/// ```
/// use syncboard_core::domain::sorting::{sort_items, SortField, SortOrder};
/// use syncboard_core::domain::item::ClipboardItem;
///
/// let mut items = vec![
///     ClipboardItem::new("b".parse().unwrap(), "second".to_string()),
///     ClipboardItem::new("a".parse().unwrap(), "first".to_string()),
/// ];
///
/// sort_items(&mut items, SortField::Id, SortOrder::Ascending);
/// assert_eq!(items[0].id.as_str(), "a");
/// ```
pub fn sort_items(items: &mut [ClipboardItem], field: SortField, order: SortOrder) {
    items.sort_by(|a, b| {
        let cmp = match field {
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Content => compare_content(&a.content, &b.content),
            SortField::Id => Ordering::Equal,
        }
        .then_with(|| a.id.cmp(&b.id));

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Newest first, the order boards are always presented in
pub fn sort_newest_first(items: &mut [ClipboardItem]) {
    sort_items(items, SortField::Created, SortOrder::Descending);
}

/// Case-insensitive comparison
fn compare_content(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
