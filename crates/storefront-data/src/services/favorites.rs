//! Favorites endpoints.

use super::endpoints::FAVORITES;
use super::ProductService;
use crate::{ApiResponse, ErrorKind, FetchClient, FetchError};
use futures::future::join_all;
use storefront_commerce::favorites::FavoriteEntry;
use storefront_commerce::{Product, ProductId, UserId};
use tracing::{debug, warn};

/// Server-side favorites of one user.
pub struct FavoritesService<'a> {
    client: &'a FetchClient,
    user_id: &'a UserId,
}

impl<'a> FavoritesService<'a> {
    pub(crate) fn new(client: &'a FetchClient, user_id: &'a UserId) -> Self {
        Self { client, user_id }
    }

    /// `GET /favorites`.
    pub async fn list(&self) -> Result<ApiResponse<Vec<FavoriteEntry>>, FetchError> {
        self.client.get(FAVORITES).fetch().await
    }

    /// `POST /favorites` with a client-generated `fav_` id.
    pub async fn add(&self, product_id: &ProductId) -> Result<ApiResponse<FavoriteEntry>, FetchError> {
        let entry = FavoriteEntry::new(product_id.clone(), self.user_id.clone());
        self.client.post(FAVORITES).json(&entry)?.fetch().await
    }

    /// Find the entry for `product_id` and delete it by its own id.
    ///
    /// Succeeds without a delete when the product is not a favorite.
    pub async fn remove(&self, product_id: &ProductId) -> Result<ApiResponse<()>, FetchError> {
        let favorites = self.list().await?.data;
        match favorites.iter().find(|f| &f.product_id == product_id) {
            Some(entry) => {
                self.client
                    .delete(format!("{}/{}", FAVORITES, entry.id))
                    .fetch_empty()
                    .await
            }
            None => {
                debug!(product_id = %product_id, "favorite not found, nothing to remove");
                Ok(ApiResponse::ok(()))
            }
        }
    }

    /// Membership check against the server; any failure reads as `false`.
    pub async fn is_favorite(&self, product_id: &ProductId) -> bool {
        match self.list().await {
            Ok(response) => response.data.iter().any(|f| &f.product_id == product_id),
            Err(error) => {
                warn!(product_id = %product_id, %error, "Error checking favorite status");
                false
            }
        }
    }

    /// Fetch the product behind every favorite, in favorite order.
    ///
    /// Favorites whose product no longer exists (404) are skipped; any
    /// other failure fails the whole call.
    pub async fn favorite_products(&self) -> Result<ApiResponse<Vec<Product>>, FetchError> {
        let favorites = self.list().await?.data;
        let products = ProductService::new(self.client);
        let results = join_all(favorites.iter().map(|f| products.get(&f.product_id))).await;

        let mut hydrated = Vec::with_capacity(results.len());
        for (favorite, result) in favorites.iter().zip(results) {
            match result {
                Ok(response) => hydrated.push(response.data),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(product_id = %favorite.product_id, "favorite points at a missing product");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(ApiResponse::ok(hydrated))
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockBackend;
    use crate::{ApiGateway, FetchClient, Method, RetryPolicy};
    use serde_json::json;
    use storefront_commerce::{Product, ProductId};

    fn gateway(mock: &MockBackend) -> ApiGateway {
        let client = FetchClient::with_transport(mock.clone())
            .with_query_policy(RetryPolicy::none())
            .with_mutation_policy(RetryPolicy::none());
        ApiGateway::new(client).with_user_id("42")
    }

    #[tokio::test]
    async fn test_add_generates_id_and_user() {
        let mock = MockBackend::new();
        let api = gateway(&mock);

        let entry = api.favorites().add(&ProductId::new("p1")).await.unwrap().data;
        assert!(entry.id.as_str().starts_with("fav_"));
        assert_eq!(entry.user_id.as_str(), "42");
        assert_eq!(mock.collection("favorites")[0]["productId"], "p1");
    }

    #[tokio::test]
    async fn test_remove_finds_entry_by_product() {
        let mock = MockBackend::new();
        mock.insert(
            "favorites",
            json!({"id": "fav_1", "productId": "p1", "userId": "1", "createdAt": "2024-01-01T00:00:00Z"}),
        );
        let api = gateway(&mock);

        api.favorites().remove(&ProductId::new("p1")).await.unwrap();
        assert!(mock.collection("favorites").is_empty());
        assert_eq!(mock.request_count(Method::Delete, "/favorites/fav_1"), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop_success() {
        let mock = MockBackend::new();
        let api = gateway(&mock);

        api.favorites().remove(&ProductId::new("p9")).await.unwrap();
        assert_eq!(mock.requests(), vec![(Method::Get, "/favorites".to_string())]);
    }

    #[tokio::test]
    async fn test_is_favorite_swallows_errors() {
        let mock = MockBackend::new();
        mock.insert(
            "favorites",
            json!({"id": "fav_1", "productId": "p1", "userId": "1", "createdAt": "2024-01-01T00:00:00Z"}),
        );
        let api = gateway(&mock);
        assert!(api.favorites().is_favorite(&ProductId::new("p1")).await);
        assert!(!api.favorites().is_favorite(&ProductId::new("p2")).await);

        mock.fail(Method::Get, "/favorites", 500);
        assert!(!api.favorites().is_favorite(&ProductId::new("p1")).await);
    }

    #[tokio::test]
    async fn test_favorite_products_skips_dangling() {
        let mock = MockBackend::new();
        mock.seed("products", &[Product::new("p1", "Lamp", 10.0)]);
        for (id, product) in [("fav_1", "p1"), ("fav_2", "gone")] {
            mock.insert(
                "favorites",
                json!({"id": id, "productId": product, "userId": "1", "createdAt": "2024-01-01T00:00:00Z"}),
            );
        }
        let api = gateway(&mock);

        let products = api.favorites().favorite_products().await.unwrap().data;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "p1");
    }

    #[tokio::test]
    async fn test_favorite_products_propagates_server_errors() {
        let mock = MockBackend::new();
        mock.insert(
            "favorites",
            json!({"id": "fav_1", "productId": "p1", "userId": "1", "createdAt": "2024-01-01T00:00:00Z"}),
        );
        mock.fail(Method::Get, "/products/p1", 503);
        let api = gateway(&mock);

        let err = api.favorites().favorite_products().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
