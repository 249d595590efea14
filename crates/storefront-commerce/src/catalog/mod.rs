//! Product catalog module.
//!
//! Contains types for products and categories plus the stock and
//! discount helpers used by listings.

mod category;
mod product;

pub use category::Category;
pub use product::{calculate_discount_percentage, is_in_stock, Product};
