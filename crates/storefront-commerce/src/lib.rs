//! Storefront domain types and pure helpers.
//!
//! This crate holds everything the storefront client computes without
//! touching the network:
//!
//! - **Catalog**: Products, categories, stock and discount helpers
//! - **Cart**: Line items, variants, totals and counts
//! - **Favorites**: Favorite entries and the product id set
//! - **Search**: Filter criteria, sort keys, pagination
//! - **Money**: Currency table and locale-aware formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//!
//! let criteria = FilterCriteria::default();
//! let visible = filter_products(&products, &criteria, "headphones");
//! let sorted = sort_products(&visible, SortOption::PriceAsc);
//! let page = paginate(&sorted, 1, 12);
//!
//! let total = calculate_cart_total(&cart_items);
//! println!("Total: {}", format_currency(total, "USD", "en-US"));
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod text;

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod search;

pub use catalog::{Category, Product};
pub use error::CommerceError;
pub use ids::*;
pub use money::{format_currency, Currency};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{format_currency, Currency};
    pub use crate::text::{generate_slug, is_valid_email, truncate_text};

    // Catalog
    pub use crate::catalog::{
        calculate_discount_percentage, is_in_stock, Category, Product,
    };

    // Cart
    pub use crate::cart::{
        calculate_cart_item_count, calculate_cart_total, CartLineItem, CartLinePatch, CartLines,
        NewCartLineItem, ProductVariant,
    };

    // Favorites
    pub use crate::favorites::{FavoriteEntry, FavoriteSet};

    // Search
    pub use crate::search::{
        filter_products, paginate, sort_products, FilterCriteria, FilterPatch, Page, Pagination,
        PriceRange, SortOption, ALL_CATEGORIES,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_catalog_types_at_crate_root() {
        let category = crate::Category::new("c1", "Home Office");
        let product = crate::Product::new("p1", "Desk", 120.0).with_category(category.slug.clone());
        assert_eq!(product.category, "home-office");
    }
}
