//! Product search: filtering, sorting and pagination.
//!
//! The listing view is always derived as
//! `filter_products -> sort_products -> paginate`.

mod filter;
mod query;
mod results;

pub use filter::{filter_products, FilterCriteria, FilterPatch, PriceRange, ALL_CATEGORIES};
pub use query::{
    sort_products, PricePreset, SortOption, PRICE_PRESETS, PRODUCTS_PAGE_SIZE, RATING_PRESETS,
    RELATED_PRODUCTS_LIMIT, SEARCH_PAGE_SIZE,
};
pub use results::{paginate, Page, Pagination};
