//! Cart line items and the line collection.

use crate::error::CommerceError;
use crate::ids::{LineItemId, ProductId, VariantId};
use crate::money::{from_cents, to_cents};
use serde::{Deserialize, Serialize};

/// A selectable product variant (size, colour, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant identifier.
    pub id: VariantId,
    /// Option name (e.g., "Size").
    pub name: String,
    /// Option value (e.g., "L").
    pub value: String,
    /// Added to the base price when selected.
    #[serde(default)]
    pub price_modifier: f64,
}

/// One row in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Server-assigned line identifier.
    pub id: LineItemId,
    /// Product this line refers to. May dangle if the product is removed.
    pub product_id: ProductId,
    /// Positive quantity.
    pub quantity: u32,
    /// Unit price snapshot taken when the line was added.
    pub price: f64,
    /// Selected variant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<ProductVariant>,
}

impl CartLineItem {
    /// Build a line from a create request and the id the server assigned.
    pub fn from_new(id: LineItemId, item: NewCartLineItem) -> Self {
        Self {
            id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            selected_variant: item.selected_variant,
        }
    }

    /// `price * quantity` in cents, saturating on absurd prices.
    pub fn line_total_cents(&self) -> i64 {
        to_cents(self.price).saturating_mul(i64::from(self.quantity))
    }
}

/// Body of `POST /cart`: a line without an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCartLineItem {
    /// Product to add.
    pub product_id: ProductId,
    /// Quantity to add.
    pub quantity: u32,
    /// Unit price snapshot.
    pub price: f64,
    /// Selected variant, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<ProductVariant>,
}

impl NewCartLineItem {
    /// Create a request to add `quantity` units of a product.
    ///
    /// Zero quantities are rejected here rather than sent to the server.
    pub fn new(
        product_id: impl Into<ProductId>,
        quantity: u32,
        price: f64,
    ) -> Result<Self, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(CommerceError::ValidationError(format!(
                "price must be a non-negative number, got {}",
                price
            )));
        }
        Ok(Self {
            product_id: product_id.into(),
            quantity,
            price,
            selected_variant: None,
        })
    }

    /// Attach a variant.
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.selected_variant = Some(variant);
        self
    }
}

/// Body of `PATCH /cart/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLinePatch {
    /// New quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

/// What [`CartLines::merge`] did with an incoming line.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// A line for the same product existed; its quantity grew.
    Merged { id: LineItemId, quantity: u32 },
    /// No line for the product existed; the incoming line was appended.
    Appended(LineItemId),
}

/// Ordered cart lines, at most one per product under normal flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CartLines {
    items: Vec<CartLineItem>,
}

impl CartLines {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a canonical server list, folding any
    /// duplicate product rows into the first one.
    pub fn from_server(items: Vec<CartLineItem>) -> Self {
        let mut lines = Self::new();
        for item in items {
            lines.merge(item);
        }
        lines
    }

    /// Add a line, summing quantities if the product is already present.
    pub fn merge(&mut self, incoming: CartLineItem) -> MergeOutcome {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == incoming.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(incoming.quantity);
            return MergeOutcome::Merged {
                id: existing.id.clone(),
                quantity: existing.quantity,
            };
        }

        let id = incoming.id.clone();
        self.items.push(incoming);
        MergeOutcome::Appended(id)
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// Returns whether a line with that id existed.
    pub fn update_quantity(&mut self, id: &LineItemId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id).is_some();
        }
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                true
            }
            None => false,
        }
    }

    /// Replace the line that has the same id as `item`.
    ///
    /// Returns false (and changes nothing) if there is no such line.
    pub fn replace(&mut self, item: CartLineItem) -> bool {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Re-key a line, e.g. when a temporary id is swapped for the server's.
    pub fn rename(&mut self, from: &LineItemId, to: LineItemId) -> bool {
        match self.items.iter_mut().find(|i| &i.id == from) {
            Some(item) => {
                item.id = to;
                true
            }
            None => false,
        }
    }

    /// Remove a line by id, returning it.
    pub fn remove(&mut self, id: &LineItemId) -> Option<CartLineItem> {
        let index = self.items.iter().position(|i| &i.id == id)?;
        Some(self.items.remove(index))
    }

    /// Put a line back, replacing any line with the same id.
    pub fn restore(&mut self, item: CartLineItem) {
        if !self.replace(item.clone()) {
            self.items.push(item);
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Get a line by id.
    pub fn get(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Get the line for a product.
    pub fn get_by_product(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sum of `price * quantity` over all lines; 0 for an empty cart.
pub fn calculate_cart_total(items: &[CartLineItem]) -> f64 {
    from_cents(
        items
            .iter()
            .map(CartLineItem::line_total_cents)
            .fold(0i64, i64::saturating_add),
    )
}

/// Sum of quantities over all lines; 0 for an empty cart.
pub fn calculate_cart_item_count(items: &[CartLineItem]) -> u64 {
    items.iter().map(|i| u64::from(i.quantity)).sum()
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

    #[test]
    fn test_totals() {
        let items = vec![line("a", "p1", 2, 10.0), line("b", "p2", 1, 5.0)];
        assert_eq!(calculate_cart_total(&items), 25.0);
        assert_eq!(calculate_cart_item_count(&items), 3);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(calculate_cart_total(&[]), 0.0);
        assert_eq!(calculate_cart_item_count(&[]), 0);
    }

    #[test]
    fn test_total_has_no_float_drift() {
        let items = vec![line("a", "p1", 3, 0.1), line("b", "p2", 1, 0.2)];
        assert_eq!(calculate_cart_total(&items), 0.5);
    }

    #[test]
    fn test_total_saturates_on_huge_prices() {
        let items = vec![line("a", "p1", 2, 1e17), line("b", "p2", 3, 1e17)];
        assert_eq!(items[0].line_total_cents(), i64::MAX);
        assert_eq!(calculate_cart_total(&items), from_cents(i64::MAX));
    }

    #[test]
    fn test_merge_same_product_sums_quantity() {
        let mut lines = CartLines::new();
        lines.merge(line("a", "p1", 1, 10.0));
        let outcome = lines.merge(line("b", "p1", 2, 10.0));

        assert_eq!(
            outcome,
            MergeOutcome::Merged {
                id: LineItemId::new("a"),
                quantity: 3
            }
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.items()[0].quantity, 3);
    }

    #[test]
    fn test_from_server_folds_duplicates() {
        let lines = CartLines::from_server(vec![
            line("a", "p1", 1, 10.0),
            line("b", "p2", 1, 4.0),
            line("c", "p1", 4, 10.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.get_by_product(&ProductId::new("p1")).unwrap().quantity, 5);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut lines = CartLines::from_server(vec![line("a", "p1", 2, 10.0)]);
        assert!(lines.update_quantity(&LineItemId::new("a"), 0));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut lines = CartLines::from_server(vec![line("a", "p1", 2, 10.0)]);
        assert!(lines.update_quantity(&LineItemId::new("a"), 7));
        assert_eq!(lines.items()[0].quantity, 7);
        assert!(!lines.update_quantity(&LineItemId::new("missing"), 7));
    }

    #[test]
    fn test_new_line_rejects_zero_quantity() {
        assert_eq!(
            NewCartLineItem::new("p1", 0, 1.0),
            Err(CommerceError::InvalidQuantity(0))
        );
        assert!(NewCartLineItem::new("p1", 1, -1.0).is_err());
    }

    #[test]
    fn test_restore_after_remove() {
        let mut lines = CartLines::from_server(vec![line("a", "p1", 2, 10.0)]);
        let removed = lines.remove(&LineItemId::new("a")).unwrap();
        lines.restore(removed);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_line_serializes_camel_case() {
        let json = serde_json::to_value(line("a", "p1", 2, 10.0)).unwrap();
        assert_eq!(json["productId"], "p1");
        assert!(json.get("selectedVariant").is_none());
    }
}
