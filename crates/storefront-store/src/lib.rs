//! Client-side state for the storefront.
//!
//! Three stores ([`ProductsState`], [`CartState`], [`FavoritesState`]) hold
//! what the client knows. The [`Storefront`] controller owns them, runs
//! async operations against the [`ApiGateway`](storefront_data::ApiGateway)
//! and settles each response into the stores.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_store::prelude::*;
//!
//! let store = Storefront::new(ApiGateway::new(FetchClient::new()));
//! store.fetch_products(&ProductQuery::default()).await?;
//! store.add_to_cart(NewCartLineItem::new("1", 2, 19.99)?).await?;
//!
//! let total = store.read(|s| s.cart.total_amount());
//! ```

pub mod cart;
pub mod debounce;
pub mod favorites;
pub mod products;
pub mod state;
pub mod sync;

pub use cart::{CartOp, CartState};
pub use debounce::Debouncer;
pub use favorites::{FavoritesOp, FavoritesState, ToggleAction};
pub use products::{ProductFetch, ProductsState};
pub use state::{error_message, AppState, Storefront};
pub use sync::{EntitySync, LoadState, RequestTracker, SyncLedger, Ticket};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AppState, CartState, Debouncer, EntitySync, FavoritesState, LoadState, ProductFetch,
        ProductsState, Storefront, ToggleAction,
    };
    pub use storefront_commerce::prelude::*;
    pub use storefront_data::{ApiGateway, FetchClient, FetchError, ProductQuery};
}
