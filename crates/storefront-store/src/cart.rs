//! Cart store.
//!
//! Lines follow merge semantics: adding a product that is already in the
//! cart grows the existing line. Totals are derived from the lines on
//! every read, so they cannot drift from them.

use crate::sync::{EntitySync, LoadState, SyncLedger};
use storefront_commerce::cart::{
    calculate_cart_item_count, calculate_cart_total, CartLineItem, CartLines, MergeOutcome,
    NewCartLineItem,
};
use storefront_commerce::{LineItemId, ProductId};

/// Async cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOp {
    Fetch,
    Add,
    Update,
    Remove,
    Clear,
}

impl CartOp {
    /// Message recorded when the server gives none.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            CartOp::Fetch => "Failed to fetch cart items",
            CartOp::Add => "Failed to add item to cart",
            CartOp::Update => "Failed to update cart item",
            CartOp::Remove => "Failed to remove item from cart",
            CartOp::Clear => "Failed to clear cart",
        }
    }
}

/// Cart lines plus the sync status of each product's line.
///
/// The ledger maps a product to the line the server agrees on (`None`
/// when the product is not in the server's cart).
#[derive(Debug, Clone, Default)]
pub struct CartState {
    lines: CartLines,
    status: LoadState,
    error: Option<String>,
    is_open: bool,
    sync: SyncLedger<ProductId, Option<CartLineItem>>,
}

impl CartState {
    /// Empty, closed cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed lines from a local snapshot without touching sync state.
    pub fn restore(&mut self, items: Vec<CartLineItem>) {
        self.lines = CartLines::from_server(items);
    }

    /// A non-optimistic operation was dispatched.
    pub fn begin(&mut self) {
        self.status = LoadState::Loading;
        self.error = None;
    }

    /// A non-optimistic operation failed; lines stay as they were.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = LoadState::Failed;
        self.error = Some(message.into());
    }

    fn settle_product(&mut self, product_id: &ProductId) {
        let line = self.lines.get_by_product(product_id).cloned();
        self.sync.commit(product_id.clone(), line);
        self.status = LoadState::Succeeded;
    }

    /// Replace the lines with the server's list.
    pub fn commit_fetch(&mut self, items: Vec<CartLineItem>) {
        self.lines = CartLines::from_server(items);
        self.sync.clear();
        self.status = LoadState::Succeeded;
    }

    /// Merge a line the server created.
    pub fn commit_add(&mut self, line: CartLineItem) -> MergeOutcome {
        let product_id = line.product_id.clone();
        let outcome = self.lines.merge(line);
        self.settle_product(&product_id);
        outcome
    }

    /// Apply a quantity change the server accepted. `None` means the line
    /// was deleted.
    pub fn commit_update(&mut self, id: &LineItemId, line: Option<CartLineItem>) {
        let product_id = self.lines.get(id).map(|l| l.product_id.clone());
        match line {
            Some(line) => {
                self.lines.replace(line);
            }
            None => {
                self.lines.remove(id);
            }
        }
        match product_id {
            Some(product_id) => self.settle_product(&product_id),
            None => self.status = LoadState::Succeeded,
        }
    }

    /// Drop a line the server deleted.
    pub fn commit_remove(&mut self, id: &LineItemId) {
        match self.lines.remove(id) {
            Some(removed) => self.settle_product(&removed.product_id),
            None => self.status = LoadState::Succeeded,
        }
    }

    /// The server cart is empty.
    pub fn commit_clear(&mut self) {
        self.lines.clear();
        self.sync.clear();
        self.status = LoadState::Succeeded;
    }

    // --- optimistic ---

    /// Merge a line under a temporary id before the server answers.
    pub fn optimistic_add(&mut self, item: NewCartLineItem) -> MergeOutcome {
        let product_id = item.product_id.clone();
        let before = self.lines.get_by_product(&product_id).cloned();
        let outcome = self
            .lines
            .merge(CartLineItem::from_new(LineItemId::generate(), item));
        let after = self.lines.get_by_product(&product_id).cloned();
        self.sync.begin(product_id, after, before);
        outcome
    }

    /// Adopt the server's line for an optimistic add. The optimistic
    /// quantity is kept; only a temporary id is swapped.
    pub fn reconcile_add(&mut self, outcome: &MergeOutcome, server: CartLineItem) {
        if let MergeOutcome::Appended(temp) = outcome {
            self.lines.rename(temp, server.id.clone());
        }
        self.settle_product(&server.product_id);
    }

    /// Set a quantity before the server answers; zero or negative removes.
    ///
    /// Returns the product the line belongs to, or `None` for unknown ids.
    pub fn optimistic_update_quantity(&mut self, id: &LineItemId, quantity: i64) -> Option<ProductId> {
        let before = self.lines.get(id).cloned()?;
        self.lines.update_quantity(id, quantity);
        let after = self.lines.get(id).cloned();
        self.sync.begin(before.product_id.clone(), after, Some(before.clone()));
        Some(before.product_id)
    }

    /// Drop a line before the server answers.
    pub fn optimistic_remove(&mut self, id: &LineItemId) -> Option<ProductId> {
        let removed = self.lines.remove(id)?;
        self.sync
            .begin(removed.product_id.clone(), None, Some(removed.clone()));
        Some(removed.product_id)
    }

    /// Adopt the server's copy of a line after an optimistic quantity
    /// change; `None` means the server deleted it.
    pub fn reconcile_line(&mut self, product_id: &ProductId, server: Option<CartLineItem>) {
        if let Some(line) = server {
            self.lines.replace(line);
        }
        self.settle_product(product_id);
    }

    /// Confirm an optimistic change to a product's line.
    pub fn confirm(&mut self, product_id: &ProductId) {
        self.settle_product(product_id);
    }

    /// An optimistic change was rejected. The optimistic value stays
    /// visible until [`revert`](Self::revert) is called.
    pub fn fail_optimistic(&mut self, product_id: &ProductId, message: impl Into<String>) {
        let message = message.into();
        let current = self.lines.get_by_product(product_id).cloned();
        self.sync.fail(product_id.clone(), message.clone(), current);
        self.fail(message);
    }

    /// Put a failed product's line back to what the server last agreed to.
    pub fn revert(&mut self, product_id: &ProductId) -> bool {
        let Some(last_good) = self.sync.revert(product_id) else {
            return false;
        };
        if let Some(id) = self.lines.get_by_product(product_id).map(|l| l.id.clone()) {
            self.lines.remove(&id);
        }
        if let Some(line) = last_good {
            self.lines.restore(line);
        }
        true
    }

    // --- ui ---

    /// Flip the cart panel's visibility.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Show the cart panel.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Hide the cart panel.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Forget the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // --- selectors ---

    /// Lines in order.
    pub fn items(&self) -> &[CartLineItem] {
        self.lines.items()
    }

    /// The line collection.
    pub fn lines(&self) -> &CartLines {
        &self.lines
    }

    /// Sum of `price * quantity`.
    pub fn total_amount(&self) -> f64 {
        calculate_cart_total(self.lines.items())
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> u64 {
        calculate_cart_item_count(self.lines.items())
    }

    /// Look up a line by its id.
    pub fn item_by_id(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.lines.get(id)
    }

    /// The line holding a product, if any.
    pub fn item_by_product_id(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.lines.get_by_product(product_id)
    }

    /// Whether a product has a line.
    pub fn is_in_cart(&self, product_id: &ProductId) -> bool {
        self.lines.get_by_product(product_id).is_some()
    }

    /// Quantity of a product in the cart, 0 when absent.
    pub fn quantity_for_product(&self, product_id: &ProductId) -> u32 {
        self.lines
            .get_by_product(product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Whether the cart panel is shown.
    pub fn is_open(&self) -> bool {
        self.is_open
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

    /// Sync status of a product's line, if it was ever changed optimistically.
    pub fn sync_state(&self, product_id: &ProductId) -> Option<&EntitySync<Option<CartLineItem>>> {
        self.sync.get(product_id)
    }

    /// Products whose last optimistic change was rejected.
    pub fn failed_products(&self) -> Vec<ProductId> {
        self.sync.failed_keys()
    }

    /// Optimistic changes still waiting for the server.
    pub fn pending_count(&self) -> usize {
        self.sync.pending_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, product: &str, quantity: u32, price: f64) -> CartLineItem {
        CartLineItem {
            id: LineItemId::new(id),
            product_id: ProductId::new(product),
            quantity,
            price,
            selected_variant: None,
        }
    }

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_add_merges_and_totals_follow() {
        let mut cart = CartState::new();
        cart.commit_add(line("10", "p1", 1, 10.0));
        cart.commit_add(line("11", "p1", 2, 10.0));
        cart.commit_add(line("12", "p2", 1, 5.5));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity_for_product(&pid("p1")), 3);
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_amount(), 35.5);
    }

    #[test]
    fn test_update_to_none_removes_line() {
        let mut cart = CartState::new();
        cart.commit_fetch(vec![line("10", "p1", 2, 10.0)]);
        cart.commit_update(&LineItemId::new("10"), None);
        assert!(cart.items().is_empty());
        assert_eq!(cart.total_amount(), 0.0);
    }

    #[test]
    fn test_failure_keeps_lines() {
        let mut cart = CartState::new();
        cart.commit_fetch(vec![line("10", "p1", 2, 10.0)]);
        cart.begin();
        cart.fail(CartOp::Fetch.fallback_error());

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.error(), Some("Failed to fetch cart items"));
        assert_eq!(cart.status(), LoadState::Failed);
    }

    #[test]
    fn test_optimistic_add_then_reconcile() {
        let mut cart = CartState::new();
        let item = NewCartLineItem::new("p1", 2, 10.0).unwrap();
        let outcome = cart.optimistic_add(item);
        assert_eq!(cart.total_items(), 2);
        assert!(cart.sync_state(&pid("p1")).unwrap().is_pending());

        cart.reconcile_add(&outcome, line("1000", "p1", 2, 10.0));
        assert_eq!(cart.items()[0].id.as_str(), "1000");
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.pending_count(), 0);
    }

    #[test]
    fn test_optimistic_add_failure_then_revert() {
        let mut cart = CartState::new();
        cart.commit_fetch(vec![line("10", "p1", 1, 10.0)]);
        cart.optimistic_add(NewCartLineItem::new("p1", 2, 10.0).unwrap());
        assert_eq!(cart.quantity_for_product(&pid("p1")), 3);

        cart.fail_optimistic(&pid("p1"), "HTTP 500: Internal Server Error");
        // no automatic rollback
        assert_eq!(cart.quantity_for_product(&pid("p1")), 3);
        assert_eq!(cart.failed_products(), vec![pid("p1")]);

        assert!(cart.revert(&pid("p1")));
        assert_eq!(cart.quantity_for_product(&pid("p1")), 1);
        assert!(cart.failed_products().is_empty());
    }

    #[test]
    fn test_revert_removes_line_that_never_existed() {
        let mut cart = CartState::new();
        cart.optimistic_add(NewCartLineItem::new("p1", 1, 10.0).unwrap());
        cart.fail_optimistic(&pid("p1"), "boom");
        assert!(cart.revert(&pid("p1")));
        assert!(!cart.is_in_cart(&pid("p1")));
    }

    #[test]
    fn test_optimistic_remove_and_revert() {
        let mut cart = CartState::new();
        cart.commit_fetch(vec![line("10", "p1", 2, 10.0)]);
        assert_eq!(cart.optimistic_remove(&LineItemId::new("10")), Some(pid("p1")));
        assert!(cart.items().is_empty());

        cart.fail_optimistic(&pid("p1"), "boom");
        cart.revert(&pid("p1"));
        assert_eq!(cart.item_by_id(&LineItemId::new("10")).unwrap().quantity, 2);
    }

    #[test]
    fn test_revert_without_failure_is_noop() {
        let mut cart = CartState::new();
        cart.commit_fetch(vec![line("10", "p1", 2, 10.0)]);
        cart.optimistic_update_quantity(&LineItemId::new("10"), 5);
        assert!(!cart.revert(&pid("p1")));
        assert_eq!(cart.quantity_for_product(&pid("p1")), 5);
    }

    #[test]
    fn test_open_close() {
        let mut cart = CartState::new();
        cart.toggle_open();
        assert!(cart.is_open());
        cart.close();
        assert!(!cart.is_open());
        cart.open();
        assert!(cart.is_open());
    }
}
