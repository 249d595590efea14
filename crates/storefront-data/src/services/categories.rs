//! Category endpoints.

use super::endpoints::CATEGORIES;
use crate::{ApiResponse, FetchClient, FetchError};
use storefront_commerce::{Category, CategoryId};

/// Category reads.
pub struct CategoryService<'a> {
    client: &'a FetchClient,
}

impl<'a> CategoryService<'a> {
    pub(crate) fn new(client: &'a FetchClient) -> Self {
        Self { client }
    }

    /// `GET /categories`.
    pub async fn list(&self) -> Result<ApiResponse<Vec<Category>>, FetchError> {
        self.client.get(CATEGORIES).fetch().await
    }

    /// `GET /categories/:id`.
    pub async fn get(&self, id: &CategoryId) -> Result<ApiResponse<Category>, FetchError> {
        self.client
            .get(format!("{}/{}", CATEGORIES, id))
            .fetch()
            .await
    }

    /// Categories flagged active.
    pub async fn active(&self) -> Result<ApiResponse<Vec<Category>>, FetchError> {
        self.client
            .get(CATEGORIES)
            .query("isActive", true)
            .fetch()
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockBackend;
    use crate::{ApiGateway, FetchClient};
    use serde_json::json;
    use storefront_commerce::CategoryId;

    #[tokio::test]
    async fn test_list_get_and_active() {
        let mock = MockBackend::new();
        mock.insert("categories", json!({"id": "c1", "name": "Home", "slug": "home", "isActive": true}));
        mock.insert("categories", json!({"id": "c2", "name": "Old", "slug": "old", "isActive": false}));
        let api = ApiGateway::new(FetchClient::with_transport(mock));

        assert_eq!(api.categories().list().await.unwrap().data.len(), 2);
        assert_eq!(
            api.categories().get(&CategoryId::new("c2")).await.unwrap().data.slug,
            "old"
        );
        let active = api.categories().active().await.unwrap().data;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_str(), "c1");
    }
}
