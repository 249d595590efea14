//! Products store: catalog, filters, sorting and pagination.

use crate::sync::LoadState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_commerce::search::{
    filter_products, paginate, sort_products, FilterCriteria, FilterPatch, Page, Pagination,
    PriceRange, SortOption,
};
use storefront_commerce::{Category, CommerceError, Product, ProductId};

/// Ratings at or above this are featured.
pub const FEATURED_MIN_RATING: f64 = 4.5;
/// At most this many featured products.
pub const FEATURED_LIMIT: usize = 8;

/// Async operation families of the products store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFetch {
    List,
    Detail,
    ByCategory,
    Search,
    Categories,
    Related,
}

impl ProductFetch {
    /// Message recorded when the server gives none.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            ProductFetch::List => "Failed to fetch products",
            ProductFetch::Detail => "Failed to fetch product",
            ProductFetch::ByCategory => "Failed to fetch products by category",
            ProductFetch::Search => "Failed to search products",
            ProductFetch::Categories => "Failed to fetch categories",
            ProductFetch::Related => "Failed to fetch related products",
        }
    }
}

/// Catalog state as last confirmed by the server, plus the browsing
/// controls applied on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductsState {
    items: Vec<Product>,
    categories: Vec<Category>,
    loads: HashMap<ProductFetch, LoadState>,
    error: Option<String>,
    filters: FilterCriteria,
    search_query: String,
    sort: SortOption,
    pagination: Pagination,
}

impl Default for ProductsState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            categories: Vec::new(),
            loads: HashMap::new(),
            error: None,
            filters: FilterCriteria::default(),
            search_query: String::new(),
            sort: SortOption::default(),
            pagination: Pagination::default(),
        }
    }
}

impl ProductsState {
    /// Empty catalog with default controls.
    pub fn new() -> Self {
        Self::default()
    }

    // --- lifecycle ---

    /// An operation of `family` was dispatched.
    pub fn begin(&mut self, family: ProductFetch) {
        self.loads.insert(family, LoadState::Loading);
        self.error = None;
    }

    /// An operation of `family` failed. Items are left untouched.
    pub fn fail(&mut self, family: ProductFetch, message: impl Into<String>) {
        self.loads.insert(family, LoadState::Failed);
        self.error = Some(message.into());
    }

    /// A response for `family` was discarded as stale and nothing newer is
    /// in flight.
    pub fn abandon(&mut self, family: ProductFetch) {
        if self.load_state(family).is_loading() {
            self.loads.insert(family, LoadState::Idle);
        }
    }

    fn succeed(&mut self, family: ProductFetch) {
        self.loads.insert(family, LoadState::Succeeded);
        self.recount();
    }

    fn recount(&mut self) {
        self.pagination = Pagination::new(self.pagination.page, self.pagination.limit, self.items.len());
    }

    /// Replace items with a listing result.
    pub fn commit_list(&mut self, products: Vec<Product>) {
        self.items = products;
        self.succeed(ProductFetch::List);
    }

    /// Replace items with the products of one category.
    pub fn commit_by_category(&mut self, products: Vec<Product>) {
        self.items = products;
        self.succeed(ProductFetch::ByCategory);
    }

    /// Replace items with search results.
    pub fn commit_search(&mut self, products: Vec<Product>) {
        self.items = products;
        self.succeed(ProductFetch::Search);
    }

    /// Merge one product: replace by id or append.
    pub fn commit_detail(&mut self, product: Product) {
        match self.items.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.items.push(product),
        }
        self.succeed(ProductFetch::Detail);
    }

    /// Append related products not already present.
    pub fn commit_related(&mut self, products: Vec<Product>) {
        for product in products {
            if !self.items.iter().any(|p| p.id == product.id) {
                self.items.push(product);
            }
        }
        self.succeed(ProductFetch::Related);
    }

    /// Replace the category list.
    pub fn commit_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.loads.insert(ProductFetch::Categories, LoadState::Succeeded);
    }

    // --- setters ---

    /// Set the free-text search applied by [`filtered`](Self::filtered).
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Set the listing order.
    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
    }

    /// Merge a partial filter update. An invalid price range or rating
    /// rejects the whole patch.
    pub fn set_filters(&mut self, patch: FilterPatch) -> Result<(), CommerceError> {
        if let Some(range) = patch.price_range {
            PriceRange::new(range.min, range.max)?;
        }
        if let Some(rating) = patch.rating {
            check_rating(rating)?;
        }
        self.filters.apply(patch);
        Ok(())
    }

    /// Restore default filters and clear the search query.
    pub fn reset_filters(&mut self) {
        self.filters = FilterCriteria::default();
        self.search_query.clear();
    }

    /// Set the inclusive price bounds; an invalid range is not stored.
    pub fn set_price_range(&mut self, min: f64, max: f64) -> Result<(), CommerceError> {
        self.filters.price_range = PriceRange::new(min, max)?;
        Ok(())
    }

    /// Add the category to the filter, or remove it if present.
    pub fn toggle_category_filter(&mut self, category: &str) {
        self.filters.toggle_category(category);
    }

    /// Add the brand to the filter, or remove it if present.
    pub fn toggle_brand_filter(&mut self, brand: &str) {
        self.filters.toggle_brand(brand);
    }

    /// Select a page. Out-of-range pages render empty.
    pub fn set_page(&mut self, page: i64) {
        self.pagination.page = page;
    }

    /// Change the page size and go back to page 1; zero is rejected.
    pub fn set_page_limit(&mut self, limit: usize) -> Result<(), CommerceError> {
        if limit == 0 {
            return Err(CommerceError::ValidationError(
                "page limit must be positive".to_string(),
            ));
        }
        self.pagination = Pagination::new(1, limit, self.items.len());
        Ok(())
    }

    /// Forget the last error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replace a product in place. Unknown ids are ignored.
    pub fn update_product(&mut self, product: Product) -> bool {
        match self.items.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product;
                true
            }
            None => false,
        }
    }

    // --- selectors ---

    /// Items as last fetched, unfiltered.
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Categories as last fetched.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Message of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Active filters.
    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Active search text.
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Active sort order.
    pub fn sort(&self) -> SortOption {
        self.sort
    }

    /// Page selection, with totals counted over the fetched items.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Load state of one operation family; `Idle` if never dispatched.
    pub fn load_state(&self, family: ProductFetch) -> LoadState {
        self.loads.get(&family).copied().unwrap_or_default()
    }

    /// Whether any product operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.loads.values().any(LoadState::is_loading)
    }

    /// Look up a fetched product.
    pub fn product_by_id(&self, id: &ProductId) -> Option<&Product> {
        self.items.iter().find(|p| &p.id == id)
    }

    /// Fetched products whose category slug is `category`.
    pub fn products_by_category(&self, category: &str) -> Vec<&Product> {
        self.items.iter().filter(|p| p.category == category).collect()
    }

    /// Fetched products marked on sale.
    pub fn sale_products(&self) -> Vec<&Product> {
        self.items.iter().filter(|p| p.is_on_sale).collect()
    }

    /// Fetched products with stock left.
    pub fn in_stock_products(&self) -> Vec<&Product> {
        self.items.iter().filter(|p| p.stock > 0).collect()
    }

    /// Products rated [`FEATURED_MIN_RATING`] or better, at most
    /// [`FEATURED_LIMIT`], in item order.
    pub fn featured_products(&self) -> Vec<&Product> {
        self.items
            .iter()
            .filter(|p| p.rating >= FEATURED_MIN_RATING)
            .take(FEATURED_LIMIT)
            .collect()
    }

    /// Items after the search query and filters, in the chosen order.
    pub fn filtered(&self) -> Vec<Product> {
        let matched = filter_products(&self.items, &self.filters, &self.search_query);
        sort_products(&matched, self.sort)
    }

    /// The current page of [`filtered`](Self::filtered).
    pub fn visible(&self) -> Page<Product> {
        paginate(&self.filtered(), self.pagination.page, self.pagination.limit)
    }
}

/// Ratings are 0 to 5; anything else would silently empty the listing.
fn check_rating(rating: f64) -> Result<(), CommerceError> {
    if rating.is_finite() && (0.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(CommerceError::ValidationError(format!(
            "rating must be between 0 and 5, got {}",
            rating
        )))
    }
}
