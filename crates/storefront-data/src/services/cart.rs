//! Cart endpoints.

use super::endpoints::CART;
use crate::{ApiResponse, FetchClient, FetchError};
use futures::future::join_all;
use storefront_commerce::cart::{CartLineItem, CartLinePatch, NewCartLineItem};
use storefront_commerce::LineItemId;
use tracing::{debug, warn};

/// Server-side cart.
pub struct CartService<'a> {
    client: &'a FetchClient,
}

impl<'a> CartService<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self { client }
    }

    /// `GET /cart`.
    pub async fn list(&self) -> Result<ApiResponse<Vec<CartLineItem>>, FetchError> {
        self.client.get(CART).fetch().await
    }

    /// `POST /cart`; the server assigns the line id.
    pub async fn add(&self, item: &NewCartLineItem) -> Result<ApiResponse<CartLineItem>, FetchError> {
        self.client.post(CART).json(item)?.fetch().await
    }

    /// `PATCH /cart/:id`.
    pub async fn update(
        &self,
        id: &LineItemId,
        patch: &CartLinePatch,
    ) -> Result<ApiResponse<CartLineItem>, FetchError> {
        self.client
            .patch(format!("{}/{}", CART, id))
            .json(patch)?
            .fetch()
            .await
    }

    /// Set a line's quantity; zero or negative deletes the line and
    /// yields `None`.
    pub async fn update_quantity(
        &self,
        id: &LineItemId,
        quantity: i64,
    ) -> Result<ApiResponse<Option<CartLineItem>>, FetchError> {
        if quantity <= 0 {
            self.remove(id).await?;
            return Ok(ApiResponse::ok(None));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| FetchError::Validation(format!("quantity {} is too large", quantity)))?;
        let patch = CartLinePatch {
            quantity: Some(quantity),
        };
        Ok(self.update(id, &patch).await?.map(Some))
    }

    /// `DELETE /cart/:id`.
    pub async fn remove(&self, id: &LineItemId) -> Result<ApiResponse<()>, FetchError> {
        self.client
            .delete(format!("{}/{}", CART, id))
            .fetch_empty()
            .await
    }

    /// Fetch every line, then delete them all concurrently.
    ///
    /// Not atomic: if some deletes fail the others stay applied, and the
    /// first failure is returned.
    pub async fn clear(&self) -> Result<ApiResponse<()>, FetchError> {
        let items = self.list().await?.data;
        let results = join_all(items.iter().map(|item| self.remove(&item.id))).await;

        let total = results.len();
        let mut first_error = None;
        let mut failed = 0;
        for result in results {
            if let Err(err) = result {
                failed += 1;
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            None => {
                debug!(deleted = total, "cart cleared");
                Ok(ApiResponse::ok(()))
            }
            Some(err) => {
                warn!(deleted = total - failed, failed, "cart clear partially failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockBackend;
    use crate::{ApiGateway, FetchClient, Method, RetryPolicy};
    use serde_json::json;
    use storefront_commerce::cart::NewCartLineItem;
    use storefront_commerce::LineItemId;

    fn gateway(mock: &MockBackend) -> ApiGateway {
        let client = FetchClient::with_transport(mock.clone())
            .with_query_policy(RetryPolicy::none())
            .with_mutation_policy(RetryPolicy::none());
        ApiGateway::new(client)
    }

    #[tokio::test]
    async fn test_add_posts_without_id() {
        let mock = MockBackend::new();
        let api = gateway(&mock);

        let item = NewCartLineItem::new("p1", 2, 9.5).unwrap();
        let line = api.cart().add(&item).await.unwrap().data;

        assert_eq!(line.quantity, 2);
        assert!(!line.id.as_str().is_empty());
        assert_eq!(mock.collection("cart").len(), 1);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_deletes() {
        let mock = MockBackend::new();
        mock.insert("cart", json!({"id": "c1", "productId": "p1", "quantity": 1, "price": 3.0}));
        let api = gateway(&mock);

        let response = api.cart().update_quantity(&LineItemId::new("c1"), 0).await.unwrap();
        assert_eq!(response.data, None);
        assert!(mock.collection("cart").is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_patches() {
        let mock = MockBackend::new();
        mock.insert("cart", json!({"id": "c1", "productId": "p1", "quantity": 1, "price": 3.0}));
        let api = gateway(&mock);

        let line = api
            .cart()
            .update_quantity(&LineItemId::new("c1"), 4)
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(mock.request_count(Method::Patch, "/cart/c1"), 1);
    }

    #[tokio::test]
    async fn test_clear_deletes_each_line() {
        let mock = MockBackend::new();
        for id in ["c1", "c2", "c3"] {
            mock.insert("cart", json!({"id": id, "productId": id, "quantity": 1, "price": 1.0}));
        }
        let api = gateway(&mock);

        api.cart().clear().await.unwrap();
        assert!(mock.collection("cart").is_empty());
        assert_eq!(mock.request_count(Method::Get, "/cart"), 1);
    }

    #[tokio::test]
    async fn test_clear_partial_failure_is_not_rolled_back() {
        let mock = MockBackend::new();
        for id in ["c1", "c2", "c3"] {
            mock.insert("cart", json!({"id": id, "productId": id, "quantity": 1, "price": 1.0}));
        }
        mock.fail(Method::Delete, "/cart/c2", 500);
        let api = gateway(&mock);

        let err = api.cart().clear().await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        let remaining = mock.collection("cart");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], "c2");
    }

    #[tokio::test]
    async fn test_clear_empty_cart() {
        let mock = MockBackend::new();
        let api = gateway(&mock);
        api.cart().clear().await.unwrap();
        assert_eq!(mock.requests().len(), 1);
    }
}
