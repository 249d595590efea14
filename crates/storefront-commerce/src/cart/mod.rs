//! Shopping cart module.
//!
//! Contains line items, variants, the line collection and cart totals.

mod line_item;

pub use line_item::{
    calculate_cart_item_count, calculate_cart_total, CartLineItem, CartLinePatch, CartLines,
    MergeOutcome, NewCartLineItem, ProductVariant,
};
