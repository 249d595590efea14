//! Product types.

use crate::ids::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product in the catalog.
///
/// Read-only from the client's point of view; a refetch may replace it
/// wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
    /// Current price (non-negative).
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
    /// Price before the sale, at least `price` when present.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub original_price: Option<f64>,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: String,
    /// Gallery image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Category slug.
    pub category: String,
    /// Average rating, 0 to 5.
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: f64,
    /// Number of reviews.
    #[serde(default, deserialize_with = "lenient::count")]
    pub review_count: u32,
    /// Units in stock.
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: u32,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Free-form specification table.
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Whether the product is on sale.
    #[serde(default)]
    pub is_on_sale: bool,
    /// Sale percentage, 0 to 100.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_number"
    )]
    pub sale_percentage: Option<f64>,
    /// Tags for search.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a product with the given identity and price; everything
    /// else starts empty.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            original_price: None,
            image_url: String::new(),
            images: Vec::new(),
            category: String::new(),
            rating: 0.0,
            review_count: 0,
            stock: 0,
            brand: String::new(),
            specifications: BTreeMap::new(),
            is_on_sale: false,
            sale_percentage: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Mark the product on sale from `original_price`.
    pub fn on_sale_from(mut self, original_price: f64) -> Self {
        self.original_price = Some(original_price);
        self.is_on_sale = true;
        self.sale_percentage = Some(calculate_discount_percentage(original_price, self.price) as f64);
        self
    }

    /// Add a tag if not already present.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Set the creation time.
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }

    /// Discount against `original_price`, 0 when there is none.
    pub fn discount_percentage(&self) -> i64 {
        self.original_price
            .map(|original| calculate_discount_percentage(original, self.price))
            .unwrap_or(0)
    }
}

/// Whether at least `quantity` units are in stock.
pub fn is_in_stock(product: &Product, quantity: u32) -> bool {
    product.stock >= quantity
}

/// Whole-number percentage saved going from `original` to `current`.
///
/// Returns 0 when `original` is not positive or `current` is negative.
/// Halves round up, so 12.5 becomes 13.
pub fn calculate_discount_percentage(original: f64, current: f64) -> i64 {
    if original <= 0.0 || current < 0.0 {
        return 0;
    }
    let pct = (original - current) / original * 100.0;
    (pct + 0.5).floor() as i64
}

/// Numeric fields that some backends send as strings.
mod lenient {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    fn parse<E: de::Error>(raw: NumberOrString) -> Result<f64, E> {
        match raw {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, got {:?}", s))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        parse(NumberOrString::deserialize(deserializer)?)
    }

    pub fn optional_number<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let n = number(deserializer)?;
        if n.is_finite() && n > 0.0 {
            Ok(n.min(u32::MAX as f64) as u32)
        } else {
            Ok(0)
        }
    }
}
