//! Favorites store.

use crate::sync::{EntitySync, LoadState, SyncLedger};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_commerce::favorites::FavoriteSet;
use storefront_commerce::ProductId;

/// Async favorites operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoritesOp {
    Fetch,
    FetchProducts,
    Add,
    Remove,
    Toggle,
}

impl FavoritesOp {
    /// Message recorded when the server gives none.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            FavoritesOp::Fetch => "Failed to fetch favorites",
            FavoritesOp::FetchProducts => "Failed to fetch favorite products",
            FavoritesOp::Add => "Failed to add to favorites",
            FavoritesOp::Remove => "Failed to remove from favorites",
            FavoritesOp::Toggle => "Failed to toggle favorite",
        }
    }
}

/// What a toggle did, decided from local state when it was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Add,
    Remove,
}

/// Favorited product ids plus per-product sync status. The ledger maps a
/// product to whether the server has it as a favorite.
#[derive(Debug, Clone, Default)]
pub struct FavoritesState {
    ids: FavoriteSet,
    status: LoadState,
    error: Option<String>,
    sync: SyncLedger<ProductId, bool>,
}

impl FavoritesState {
    /// Empty favorite set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed ids from a local snapshot without touching sync state.
    pub fn restore(&mut self, ids: FavoriteSet) {
        self.ids = ids;
    }

    /// A non-optimistic operation was dispatched.
    pub fn begin(&mut self) {
        self.status = LoadState::Loading;
        self.error = None;
    }

    /// A non-optimistic operation failed; the set stays as it was.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = LoadState::Failed;
        self.error = Some(message.into());
    }

    fn settle(&mut self, product_id: &ProductId) {
        self.sync
            .commit(product_id.clone(), self.ids.contains(product_id));
        self.status = LoadState::Succeeded;
    }

    /// Replace the set with the server's.
    pub fn commit_fetch(&mut self, ids: FavoriteSet) {
        self.ids = ids;
        self.sync.clear();
        self.status = LoadState::Succeeded;
    }

    /// The server added the product. Adding twice is a no-op.
    pub fn commit_add(&mut self, product_id: ProductId) {
        self.ids.insert(product_id.clone());
        self.settle(&product_id);
    }

    /// The server removed the product. Removing an absent id is a no-op.
    pub fn commit_remove(&mut self, product_id: &ProductId) {
        self.ids.remove(product_id);
        self.settle(product_id);
    }

    /// Apply a toggle in the direction chosen at dispatch, without re-reading membership.
    pub fn commit_toggle(&mut self, product_id: ProductId, action: ToggleAction) {
        match action {
            ToggleAction::Add => self.commit_add(product_id),
            ToggleAction::Remove => self.commit_remove(&product_id),
        }
    }

    // --- optimistic ---

    fn track(&mut self, product_id: ProductId, before: bool) {
        let after = self.ids.contains(&product_id);
        self.sync.begin(product_id, after, before);
    }

    /// Add a product before the server answers.
    pub fn optimistic_add(&mut self, product_id: ProductId) {
        let before = self.ids.contains(&product_id);
        self.ids.insert(product_id.clone());
        self.track(product_id, before);
    }

    /// Remove a product before the server answers.
    pub fn optimistic_remove(&mut self, product_id: &ProductId) {
        let before = self.ids.remove(product_id);
        self.track(product_id.clone(), before);
    }

    /// Flip membership locally. Returns the action the server must apply.
    pub fn optimistic_toggle(&mut self, product_id: ProductId) -> ToggleAction {
        let now_favorite = self.ids.toggle(product_id.clone());
        self.track(product_id, !now_favorite);
        if now_favorite {
            ToggleAction::Add
        } else {
            ToggleAction::Remove
        }
    }

    /// Confirm an optimistic change.
    pub fn confirm(&mut self, product_id: &ProductId) {
        self.settle(product_id);
    }

    /// An optimistic change was rejected. The optimistic value stays
    /// visible until [`revert`](Self::revert) is called.
    pub fn fail_optimistic(&mut self, product_id: &ProductId, message: impl Into<String>) {
        let message = message.into();
        let current = self.ids.contains(product_id);
        self.sync.fail(product_id.clone(), message.clone(), current);
        self.fail(message);
    }

    /// Restore a failed product's membership to the server's last answer.
    pub fn revert(&mut self, product_id: &ProductId) -> bool {
        match self.sync.revert(product_id) {
            Some(true) => {
                self.ids.insert(product_id.clone());
                true
            }
            Some(false) => {
                self.ids.remove(product_id);
                true
            }
            None => false,
        }
    }

    /// Forget every favorite locally.
    pub fn clear_favorites(&mut self) {
        self.ids.clear();
        self.sync.clear();
    }

    /// Forget the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // --- selectors ---

    /// Favorited ids in insertion order.
    pub fn ids(&self) -> &FavoriteSet {
        &self.ids
    }

    /// Whether a product is a favorite.
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.ids.contains(product_id)
    }

    /// Number of favorites.
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Membership of each requested product.
    pub fn favorite_status<'a>(
        &self,
        product_ids: impl IntoIterator<Item = &'a ProductId>,
    ) -> HashMap<ProductId, bool> {
        self.ids.status(product_ids)
    }

    /// Load state of the last operation.
    pub fn status(&self) -> LoadState {
        self.status
    }

    /// Whether an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Message of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sync status of a product, if it was ever changed optimistically.
    pub fn sync_state(&self, product_id: &ProductId) -> Option<&EntitySync<bool>> {
        self.sync.get(product_id)
    }

    /// Products whose last optimistic change was rejected.
    pub fn failed_products(&self) -> Vec<ProductId> {
        self.sync.failed_keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut favorites = FavoritesState::new();
        favorites.commit_add(pid("p1"));
        favorites.commit_add(pid("p1"));
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut favorites = FavoritesState::new();
        assert_eq!(favorites.optimistic_toggle(pid("p1")), ToggleAction::Add);
        assert!(favorites.is_favorite(&pid("p1")));
        assert_eq!(favorites.optimistic_toggle(pid("p1")), ToggleAction::Remove);
        assert!(!favorites.is_favorite(&pid("p1")));
    }

    #[test]
    fn test_commit_toggle() {
        let mut favorites = FavoritesState::new();
        favorites.commit_toggle(pid("p1"), ToggleAction::Add);
        assert!(favorites.is_favorite(&pid("p1")));
        favorites.commit_toggle(pid("p1"), ToggleAction::Remove);
        assert!(!favorites.is_favorite(&pid("p1")));
        assert_eq!(favorites.sync_state(&pid("p1")), Some(&EntitySync::Committed(false)));
    }

    #[test]
    fn test_failed_toggle_reverts_on_request() {
        let mut favorites = FavoritesState::new();
        favorites.commit_add(pid("p1"));
        favorites.optimistic_toggle(pid("p1"));
        favorites.fail_optimistic(&pid("p1"), FavoritesOp::Toggle.fallback_error());

        assert!(!favorites.is_favorite(&pid("p1")));
        assert_eq!(favorites.error(), Some("Failed to toggle favorite"));

        assert!(favorites.revert(&pid("p1")));
        assert!(favorites.is_favorite(&pid("p1")));
    }

    #[test]
    fn test_favorite_status_map() {
        let mut favorites = FavoritesState::new();
        favorites.commit_add(pid("p1"));
        let ids = [pid("p1"), pid("p2")];
        let status = favorites.favorite_status(ids.iter());
        assert_eq!(status.get(&pid("p1")), Some(&true));
        assert_eq!(status.get(&pid("p2")), Some(&false));
    }

    #[test]
    fn test_clear_favorites() {
        let mut favorites = FavoritesState::new();
        favorites.optimistic_add(pid("p1"));
        favorites.clear_favorites();
        assert_eq!(favorites.count(), 0);
        assert!(favorites.sync_state(&pid("p1")).is_none());
    }
}
