//! Favorites.
//!
//! The server stores one [`FavoriteEntry`] per favorited product; the
//! client only cares about which product ids are in the set.

use crate::ids::{FavoriteId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A favorited product as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    /// Client-generated identifier.
    pub id: FavoriteId,
    /// The favorited product.
    pub product_id: ProductId,
    /// Owner.
    pub user_id: UserId,
    /// When the product was favorited.
    pub created_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Create an entry with a fresh `fav_` id stamped now.
    pub fn new(product_id: impl Into<ProductId>, user_id: impl Into<UserId>) -> Self {
        Self {
            id: FavoriteId::generate(),
            product_id: product_id.into(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Insertion-ordered set of favorited product ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FavoriteSet {
    ids: Vec<ProductId>,
}

impl FavoriteSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from server entries, dropping duplicate products.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a FavoriteEntry>) -> Self {
        let mut set = Self::new();
        for entry in entries {
            set.insert(entry.product_id.clone());
        }
        set
    }

    /// Add a product id. Returns false if it was already present.
    pub fn insert(&mut self, id: ProductId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove a product id. Returns false if it was absent.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        before != self.ids.len()
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.remove(&id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Membership test.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Membership for each requested id.
    pub fn status<'a>(&self, ids: impl IntoIterator<Item = &'a ProductId>) -> HashMap<ProductId, bool> {
        ids.into_iter()
            .map(|id| (id.clone(), self.contains(id)))
            .collect()
    }

    /// Remove every id.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_empty() {
        let mut set = FavoriteSet::new();
        assert!(set.toggle(ProductId::new("p1")));
        assert!(set.contains(&ProductId::new("p1")));
        assert!(!set.toggle(ProductId::new("p1")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_is_unique() {
        let mut set = FavoriteSet::new();
        assert!(set.insert(ProductId::new("p1")));
        assert!(!set.insert(ProductId::new("p1")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_entries_dedupes() {
        let entries = vec![
            FavoriteEntry::new("p1", "1"),
            FavoriteEntry::new("p2", "1"),
            FavoriteEntry::new("p1", "1"),
        ];
        let set = FavoriteSet::from_entries(&entries);
        assert_eq!(set.ids(), &[ProductId::new("p1"), ProductId::new("p2")]);
    }

    #[test]
    fn test_status_map() {
        let mut set = FavoriteSet::new();
        set.insert(ProductId::new("p1"));
        let wanted = [ProductId::new("p1"), ProductId::new("p2")];
        let status = set.status(&wanted);
        assert_eq!(status.get(&ProductId::new("p1")), Some(&true));
        assert_eq!(status.get(&ProductId::new("p2")), Some(&false));
    }

    #[test]
    fn test_entry_wire_shape() {
        let entry = FavoriteEntry::new("p1", "1");
        assert!(entry.id.as_str().starts_with("fav_"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["userId"], "1");
        assert!(json["createdAt"].is_string());
    }
}
