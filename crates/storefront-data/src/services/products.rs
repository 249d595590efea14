//! Product endpoints.

use super::endpoints::PRODUCTS;
use crate::{ApiResponse, FetchClient, FetchError};
use storefront_commerce::search::{FilterCriteria, SortOption, RELATED_PRODUCTS_LIMIT};
use storefront_commerce::{Product, ProductId};

/// Parameters of `GET /products`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortOption>,
}

impl ProductQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, sort: SortOption) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Product catalog reads.
pub struct ProductService<'a> {
    client: &'a FetchClient,
}

impl<'a> ProductService<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self { client }
    }

    /// `GET /products?{page,limit,category,search,sort}`.
    pub async fn list(&self, query: &ProductQuery) -> Result<ApiResponse<Vec<Product>>, FetchError> {
        self.client
            .get(PRODUCTS)
            .query_opt("page", query.page)
            .query_opt("limit", query.limit)
            .query_opt("category", query.category.as_deref())
            .query_opt("search", query.search.as_deref())
            .query_opt("sort", query.sort.map(|s| s.key()))
            .fetch()
            .await
    }

    /// `GET /products/:id`.
    pub async fn get(&self, id: &ProductId) -> Result<ApiResponse<Product>, FetchError> {
        self.client
            .get(format!("{}/{}", PRODUCTS, id))
            .fetch()
            .await
    }

    /// Products in one category.
    pub async fn by_category(&self, category: &str) -> Result<ApiResponse<Vec<Product>>, FetchError> {
        self.client
            .get(PRODUCTS)
            .query("category", category)
            .fetch()
            .await
    }

    /// Full-text search narrowed by the active filters.
    pub async fn search(
        &self,
        query: &str,
        filters: Option<&FilterCriteria>,
    ) -> Result<ApiResponse<Vec<Product>>, FetchError> {
        let mut request = self.client.get(PRODUCTS).query("q", query);
        if let Some(filters) = filters {
            for category in &filters.categories {
                request = request.query("category", category);
            }
            for brand in &filters.brands {
                request = request.query("brand", brand);
            }
            request = request
                .query("price_gte", filters.price_range.min)
                .query_opt(
                    "price_lte",
                    Some(filters.price_range.max).filter(|max| max.is_finite()),
                );
            if filters.rating > 0.0 {
                request = request.query("rating_gte", filters.rating);
            }
            if filters.in_stock {
                request = request.query("stock_gte", 1);
            }
            if filters.on_sale {
                request = request.query("isOnSale", true);
            }
        }
        request.fetch().await
    }

    /// Up to `limit` products other than `id`.
    pub async fn related(
        &self,
        id: &ProductId,
        limit: Option<usize>,
    ) -> Result<ApiResponse<Vec<Product>>, FetchError> {
        self.client
            .get(PRODUCTS)
            .query("_limit", limit.unwrap_or(RELATED_PRODUCTS_LIMIT))
            .query("id_ne", id)
            .fetch()
            .await
    }
}
