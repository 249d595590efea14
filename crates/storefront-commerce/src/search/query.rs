//! Sort keys, listing presets and the product sorter.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Name A-Z.
    NameAsc,
    /// Name Z-A.
    NameDesc,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Highest rated first.
    RatingDesc,
    /// Most recently created first.
    #[default]
    Newest,
    /// Keep the incoming order.
    Unsorted,
}

impl SortOption {
    /// The options offered to users, in display order.
    pub const ALL: [SortOption; 6] = [
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::RatingDesc,
        SortOption::Newest,
    ];

    /// Parse a sort key. Unrecognized keys mean "keep the order".
    pub fn parse(key: &str) -> Self {
        match key {
            "name_asc" => SortOption::NameAsc,
            "name_desc" => SortOption::NameDesc,
            "price_asc" => SortOption::PriceAsc,
            "price_desc" => SortOption::PriceDesc,
            "rating_desc" => SortOption::RatingDesc,
            "newest" => SortOption::Newest,
            _ => SortOption::Unsorted,
        }
    }

    /// The key sent as the `sort` query parameter.
    pub fn key(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "name_asc",
            SortOption::NameDesc => "name_desc",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::RatingDesc => "rating_desc",
            SortOption::Newest => "newest",
            SortOption::Unsorted => "unsorted",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "Name A-Z",
            SortOption::NameDesc => "Name Z-A",
            SortOption::PriceAsc => "Price Low to High",
            SortOption::PriceDesc => "Price High to Low",
            SortOption::RatingDesc => "Highest Rated",
            SortOption::Newest => "Newest First",
            SortOption::Unsorted => "Unsorted",
        }
    }
}

/// A labelled price bucket for the filter sidebar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePreset {
    pub min: f64,
    pub max: f64,
    pub label: &'static str,
}

pub const PRICE_PRESETS: [PricePreset; 5] = [
    PricePreset { min: 0.0, max: 25.0, label: "Under $25" },
    PricePreset { min: 25.0, max: 50.0, label: "$25 - $50" },
    PricePreset { min: 50.0, max: 100.0, label: "$50 - $100" },
    PricePreset { min: 100.0, max: 200.0, label: "$100 - $200" },
    PricePreset { min: 200.0, max: f64::INFINITY, label: "Over $200" },
];

/// Minimum-rating choices.
pub const RATING_PRESETS: [(f64, &str); 4] = [
    (4.0, "4 Stars & Up"),
    (3.0, "3 Stars & Up"),
    (2.0, "2 Stars & Up"),
    (1.0, "1 Star & Up"),
];

/// Default page size for product listings.
pub const PRODUCTS_PAGE_SIZE: usize = 12;
/// Default page size for search results.
pub const SEARCH_PAGE_SIZE: usize = 20;
/// Default number of related products.
pub const RELATED_PRODUCTS_LIMIT: usize = 6;

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Return a sorted copy of `products`. The sort is stable, so equal keys
/// keep their incoming order and sorting twice equals sorting once.
pub fn sort_products(products: &[Product], sort: SortOption) -> Vec<Product> {
    let mut sorted = products.to_vec();
    match sort {
        SortOption::NameAsc => sorted.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOption::NameDesc => sorted.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortOption::PriceAsc => sorted.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::PriceDesc => sorted.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::RatingDesc => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortOption::Newest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Unsorted => {}
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn catalog() -> Vec<Product> {
        let day = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        vec![
            Product::new("1", "banana", 3.0).with_rating(4.0).created(day(3)),
            Product::new("2", "Apple", 5.0).with_rating(4.5).created(day(1)),
            Product::new("3", "cherry", 3.0).with_rating(4.0).created(day(2)),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_parse_keys() {
        for option in SortOption::ALL {
            assert_eq!(SortOption::parse(option.key()), option);
        }
        assert_eq!(SortOption::parse("popularity"), SortOption::Unsorted);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        assert_eq!(ids(&sort_products(&catalog(), SortOption::NameAsc)), vec!["2", "1", "3"]);
        assert_eq!(ids(&sort_products(&catalog(), SortOption::NameDesc)), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_by_price_is_stable() {
        assert_eq!(ids(&sort_products(&catalog(), SortOption::PriceAsc)), vec!["1", "3", "2"]);
        assert_eq!(ids(&sort_products(&catalog(), SortOption::PriceDesc)), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_sort_rating_and_newest() {
        assert_eq!(ids(&sort_products(&catalog(), SortOption::RatingDesc)), vec!["2", "1", "3"]);
        assert_eq!(ids(&sort_products(&catalog(), SortOption::Newest)), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = sort_products(&catalog(), SortOption::PriceAsc);
        let twice = sort_products(&once, SortOption::PriceAsc);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unsorted_keeps_order() {
        assert_eq!(ids(&sort_products(&catalog(), SortOption::Unsorted)), vec!["1", "2", "3"]);
    }
}
