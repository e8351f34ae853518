//! Local closet cache keyed by server item id.
//!
//! The cache only ever receives records from the catalog service. A record
//! is replaced wholesale on every upsert; there is no field-level merging
//! and no deletion.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::api::ApiError;
use crate::models::{Category, ClothingItem, ItemId};

/// What an upsert did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Cached copy of the remote closet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Closet {
    items: HashMap<ItemId, ClothingItem>,
}

impl Closet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache from previously persisted records.
    ///
    /// Later duplicates of an id replace earlier ones.
    pub fn from_items(items: impl IntoIterator<Item = ClothingItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&ClothingItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Inserts `remote`, or replaces the cached record with the same id.
    ///
    /// Fails only for a record without a usable `processed_url`; the cache is
    /// then left as it was.
    pub fn upsert(&mut self, remote: ClothingItem) -> Result<UpsertOutcome, ApiError> {
        validate(&remote)?;

        match self.items.get_mut(&remote.id) {
            Some(existing) if *existing == remote => Ok(UpsertOutcome::Unchanged),
            Some(existing) => {
                *existing = remote;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.items.insert(remote.id, remote);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// All items, newest first. Equal timestamps fall back to id, highest
    /// first.
    pub fn ordered(&self) -> Vec<ClothingItem> {
        let mut items: Vec<ClothingItem> = self.items.values().cloned().collect();
        sort_newest_first(&mut items);
        items
    }

    /// Items of one category, newest first.
    pub fn by_category(&self, category: Category) -> Vec<ClothingItem> {
        let mut items: Vec<ClothingItem> = self
            .items
            .values()
            .filter(|item| item.category == category)
            .cloned()
            .collect();
        sort_newest_first(&mut items);
        items
    }

    /// Drops every cached record.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Checks the invariants a record must satisfy before it may be cached.
pub(crate) fn validate(item: &ClothingItem) -> Result<(), ApiError> {
    if item.processed_url.trim().is_empty() {
        return Err(ApiError::Decode(format!(
            "item #{} has no processed_url",
            item.id
        )));
    }
    Ok(())
}

fn sort_newest_first(items: &mut [ClothingItem]) {
    items.sort_by_key(|item| Reverse((item.created_at, item.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::item;

    #[test]
    fn test_upsert_inserts_new_item() {
        let mut closet = Closet::new();
        let outcome = closet.upsert(item(1, "top", "2024-01-01T00:00:00")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(closet.len(), 1);
        assert!(closet.contains(1));
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let remote = item(1, "top", "2024-01-01T00:00:00");

        let mut once = Closet::new();
        once.upsert(remote.clone()).unwrap();

        let mut twice = Closet::new();
        twice.upsert(remote.clone()).unwrap();
        let outcome = twice.upsert(remote).unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_upsert_overwrites_instead_of_merging() {
        let mut cached = item(1, "top", "2024-01-01T00:00:00");
        cached.name = Some("A".to_string());
        cached.color = Some("red".to_string());
        let mut closet = Closet::from_items([cached]);

        let mut remote = item(1, "top", "2024-01-01T00:00:00");
        remote.name = Some("B".to_string());
        remote.color = None;
        let outcome = closet.upsert(remote.clone()).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(closet.get(1), Some(&remote));
        assert!(closet.get(1).unwrap().color.is_none());
    }

    #[test]
    fn test_upsert_replaces_category_and_photos() {
        let mut cached = item(1, "top", "2024-01-01T00:00:00");
        cached.photos = serde_json::from_value(serde_json::json!([{
            "id": 3, "item_id": 1, "processed_url": "/static/3.png",
            "created_at": "2024-01-02T00:00:00"
        }]))
        .unwrap();
        let mut closet = Closet::from_items([cached]);

        let remote = item(1, "outerwear", "2024-01-01T00:00:00");
        closet.upsert(remote).unwrap();

        let stored = closet.get(1).unwrap();
        assert_eq!(stored.category, Category::Outerwear);
        assert!(stored.photos.is_empty());
    }

    #[test]
    fn test_upsert_never_touches_other_items() {
        let b = item(2, "bottom", "2024-01-02T00:00:00");
        let mut closet = Closet::from_items([item(1, "top", "2024-01-01T00:00:00"), b.clone()]);

        let mut a = item(1, "top", "2024-01-01T00:00:00");
        a.name = Some("renamed".to_string());
        closet.upsert(a).unwrap();

        assert_eq!(closet.len(), 2);
        assert_eq!(closet.get(2), Some(&b));
    }

    #[test]
    fn test_upsert_rejects_blank_processed_url() {
        let original = item(1, "top", "2024-01-01T00:00:00");
        let mut closet = Closet::from_items([original.clone()]);

        let mut broken = original.clone();
        broken.processed_url = "  ".to_string();
        broken.name = Some("should not land".to_string());

        assert!(closet.upsert(broken).is_err());
        assert_eq!(closet.get(1), Some(&original));
    }

    #[test]
    fn test_ordered_newest_first() {
        let closet = Closet::from_items([
            item(1, "top", "2024-01-01T00:00:00"),
            item(2, "shoes", "2024-03-01T00:00:00"),
            item(3, "bottom", "2024-02-01T00:00:00"),
            item(4, "top", "2024-03-01T00:00:00"),
        ]);

        let ids: Vec<ItemId> = closet.ordered().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_by_category() {
        let closet = Closet::from_items([
            item(1, "top", "2024-01-01T00:00:00"),
            item(2, "shoes", "2024-03-01T00:00:00"),
            item(3, "top", "2024-02-01T00:00:00"),
        ]);

        let tops: Vec<ItemId> = closet.by_category(Category::Top).iter().map(|i| i.id).collect();
        assert_eq!(tops, vec![3, 1]);
        assert!(closet.by_category(Category::Accessory).is_empty());
    }
}
