//! Filter criteria and the product filter predicate.

use crate::catalog::Product;
use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Category value that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl PriceRange {
    /// Validate and build a range. Negative, NaN or inverted bounds are
    /// rejected; an infinite upper bound is allowed.
    pub fn new(min: f64, max: f64) -> Result<Self, CommerceError> {
        if min.is_nan() || max.is_nan() || min < 0.0 || !min.is_finite() || min > max {
            return Err(CommerceError::ValidationError(format!(
                "invalid price range {}..{}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Whether `price` lies within the bounds.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1000.0,
        }
    }
}

/// Active product filters. Every predicate is AND-combined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Allowed category slugs; empty (or containing `"all"`) allows any.
    pub categories: Vec<String>,
    /// Allowed brands; empty allows any.
    pub brands: Vec<String>,
    /// Inclusive price bounds.
    pub price_range: PriceRange,
    /// Minimum rating.
    pub rating: f64,
    /// Only products with stock.
    pub in_stock: bool,
    /// Only products on sale.
    pub on_sale: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            brands: Vec::new(),
            price_range: PriceRange::default(),
            rating: 0.0,
            in_stock: false,
            on_sale: false,
        }
    }
}

impl FilterCriteria {
    /// Merge the fields a patch sets.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(categories) = patch.categories {
            self.categories = categories;
        }
        if let Some(brands) = patch.brands {
            self.brands = brands;
        }
        if let Some(range) = patch.price_range {
            self.price_range = range;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(in_stock) = patch.in_stock {
            self.in_stock = in_stock;
        }
        if let Some(on_sale) = patch.on_sale {
            self.on_sale = on_sale;
        }
    }

    /// Add the category if absent, otherwise remove it.
    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.categories, category);
    }

    /// Add the brand if absent, otherwise remove it.
    pub fn toggle_brand(&mut self, brand: &str) {
        toggle(&mut self.brands, brand);
    }

    fn allows_category(&self, category: &str) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c == category || c == ALL_CATEGORIES)
    }

    fn allows_brand(&self, brand: &str) -> bool {
        self.brands.is_empty() || self.brands.iter().any(|b| b == brand)
    }

    /// Whether a product passes every active predicate.
    pub fn matches(&self, product: &Product) -> bool {
        self.allows_category(&product.category)
            && self.allows_brand(&product.brand)
            && self.price_range.contains(product.price)
            && product.rating >= self.rating
            && (!self.in_stock || product.stock > 0)
            && (!self.on_sale || product.is_on_sale)
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(index) = values.iter().position(|v| v == value) {
        values.remove(index);
    } else {
        values.push(value.to_string());
    }
}

/// Partial update for [`FilterCriteria`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    pub categories: Option<Vec<String>>,
    pub brands: Option<Vec<String>>,
    pub price_range: Option<PriceRange>,
    pub rating: Option<f64>,
    pub in_stock: Option<bool>,
    pub on_sale: Option<bool>,
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.brand.to_lowercase().contains(needle)
        || product.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Products passing `criteria` and containing `search` (case-insensitive,
/// in name, description, brand or any tag). Relative order is preserved.
///
/// A blank search term matches everything.
pub fn filter_products(products: &[Product], criteria: &FilterCriteria, search: &str) -> Vec<Product> {
    let needle = search.trim().to_lowercase();
    products
        .iter()
        .filter(|p| needle.is_empty() || matches_search(p, &needle))
        .filter(|p| criteria.matches(p))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("1", "Wireless Headphones", 199.0)
                .with_category("electronics")
                .with_brand("SoundMax")
                .with_rating(4.6)
                .with_stock(5)
                .with_tag("audio"),
            Product::new("2", "Running Shoes", 89.0)
                .with_category("sports")
                .with_brand("Stride")
                .with_rating(4.1)
                .with_stock(0),
            Product::new("3", "Desk Lamp", 35.0)
                .with_category("home")
                .with_brand("Lumo")
                .with_rating(3.2)
                .with_stock(12)
                .on_sale_from(50.0),
            Product::new("4", "Bluetooth Speaker", 1500.0)
                .with_category("electronics")
                .with_brand("SoundMax")
                .with_rating(4.9)
                .with_stock(3),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_applies_price_cap() {
        let result = filter_products(&catalog(), &FilterCriteria::default(), "");
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_matches_tags_and_brand() {
        let criteria = FilterCriteria::default();
        assert_eq!(ids(&filter_products(&catalog(), &criteria, "AUDIO")), vec!["1"]);
        assert_eq!(ids(&filter_products(&catalog(), &criteria, "stride")), vec!["2"]);
        assert!(filter_products(&catalog(), &criteria, "nothing").is_empty());
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let criteria = FilterCriteria {
            categories: vec!["electronics".into(), "home".into()],
            in_stock: true,
            rating: 4.0,
            price_range: PriceRange::new(0.0, 5000.0).unwrap(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_products(&catalog(), &criteria, "")), vec!["1", "4"]);
    }

    #[test]
    fn test_on_sale_and_all_category() {
        let criteria = FilterCriteria {
            categories: vec![ALL_CATEGORIES.into()],
            on_sale: true,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_products(&catalog(), &criteria, "")), vec!["3"]);
    }

    #[test]
    fn test_price_range_validation() {
        assert!(PriceRange::new(10.0, 5.0).is_err());
        assert!(PriceRange::new(-1.0, 5.0).is_err());
        assert!(PriceRange::new(f64::NAN, 5.0).is_err());
        assert!(PriceRange::new(200.0, f64::INFINITY).is_ok());
        assert!(PriceRange::new(5.0, 5.0).unwrap().contains(5.0));
    }

    #[test]
    fn test_patch_and_toggle() {
        let mut criteria = FilterCriteria::default();
        criteria.apply(FilterPatch {
            on_sale: Some(true),
            ..FilterPatch::default()
        });
        assert!(criteria.on_sale);
        assert_eq!(criteria.price_range, PriceRange::default());

        criteria.toggle_brand("Lumo");
        assert_eq!(criteria.brands, vec!["Lumo".to_string()]);
        criteria.toggle_brand("Lumo");
        assert!(criteria.brands.is_empty());
    }
}
