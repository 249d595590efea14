//! Storefront services over [`FetchClient`].

mod cart;
mod categories;
mod favorites;
mod products;

pub use cart::CartService;
pub use categories::CategoryService;
pub use favorites::FavoritesService;
pub use products::{ProductQuery, ProductService};

use crate::FetchClient;
use storefront_commerce::UserId;

/// REST endpoints.
pub mod endpoints {
    pub const PRODUCTS: &str = "/products";
    pub const CATEGORIES: &str = "/categories";
    pub const CART: &str = "/cart";
    pub const FAVORITES: &str = "/favorites";
}

/// Owner stamped on new favorites when none is configured.
pub const DEFAULT_USER_ID: &str = "1";

/// Entry point to every service.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    client: FetchClient,
    user_id: UserId,
}

impl ApiGateway {
    /// Create a gateway over a configured client.
    pub fn new(client: FetchClient) -> Self {
        Self {
            client,
            user_id: UserId::new(DEFAULT_USER_ID),
        }
    }

    /// Stamp new favorites with this user.
    pub fn with_user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Owner stamped on new favorites.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The underlying client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    pub fn products(&self) -> ProductService<'_> {
        ProductService::new(&self.client)
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(&self.client)
    }

    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.client)
    }

    pub fn favorites(&self) -> FavoritesService<'_> {
        FavoritesService::new(&self.client, &self.user_id)
    }
}
