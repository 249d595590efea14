//! The [`Storefront`] controller.
//!
//! All store state lives in one [`AppState`] behind a lock that is taken
//! only for the synchronous reducer step of an operation, never across
//! a network call. Every async operation runs in three steps:
//!
//! 1. dispatch: apply the "started" (or optimistic) reducer and issue a
//!    [`Ticket`] for the operation's key
//! 2. network: call the [`ApiGateway`]
//! 3. settle: commit the response or record the error
//!
//! A query response is dropped when a newer operation on the same key has
//! already settled. Mutations always apply.

use crate::cart::{CartOp, CartState};
use crate::favorites::{FavoritesOp, FavoritesState, ToggleAction};
use crate::products::{ProductFetch, ProductsState};
use crate::sync::{RequestTracker, Ticket};
use parking_lot::RwLock;
use std::fmt;
use storefront_cache::{storage_key, Storage, StorageKeys};
use storefront_commerce::cart::{CartLineItem, NewCartLineItem};
use storefront_commerce::favorites::FavoriteSet;
use storefront_commerce::search::FilterCriteria;
use storefront_commerce::{LineItemId, Product, ProductId};
use storefront_data::{ApiGateway, FetchError, ProductQuery};
use tracing::{debug, info, warn};

/// Request keys. Operations on the same key race each other.
pub mod keys {
    use storefront_commerce::ProductId;

    /// Listing, category and search results all replace the item list.
    pub const PRODUCT_ITEMS: &str = "products.items";
    pub const CATEGORIES: &str = "products.categories";
    pub const CART: &str = "cart";
    pub const FAVORITES: &str = "favorites";

    pub fn product_detail(id: &ProductId) -> String {
        format!("products.detail:{}", id)
    }

    pub fn related(id: &ProductId) -> String {
        format!("products.related:{}", id)
    }
}

/// Everything the client knows.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub products: ProductsState,
    pub cart: CartState,
    pub favorites: FavoritesState,
}

struct Shared {
    state: AppState,
    tracker: RequestTracker,
}

/// Error text for the store: the error's own message, or `fallback` when
/// it has none.
pub fn error_message(error: &FetchError, fallback: &str) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Single writer over [`AppState`].
///
/// Share it behind an `Arc` to run operations concurrently.
pub struct Storefront {
    api: ApiGateway,
    shared: RwLock<Shared>,
    storage: Option<Storage>,
}

impl fmt::Debug for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.api)
            .field("persistent", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

impl Storefront {
    pub fn new(api: ApiGateway) -> Self {
        Self {
            api,
            shared: RwLock::new(Shared {
                state: AppState::default(),
                tracker: RequestTracker::new(),
            }),
            storage: None,
        }
    }

    /// Mirror cart and favorites into `storage` after every change.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn api(&self) -> &ApiGateway {
        &self.api
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.shared.read().state.clone()
    }

    /// Run a selector against the current state.
    pub fn read<R>(&self, selector: impl FnOnce(&AppState) -> R) -> R {
        selector(&self.shared.read().state)
    }

    /// Apply a synchronous reducer.
    pub fn dispatch<R>(&self, reducer: impl FnOnce(&mut AppState) -> R) -> R {
        let result = reducer(&mut self.shared.write().state);
        self.persist();
        result
    }

    // --- persistence ---

    fn storage_key(&self, base: &str) -> String {
        storage_key!(base, self.api.user_id())
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let (lines, favorites) = {
            let shared = self.shared.read();
            (
                shared.state.cart.items().to_vec(),
                shared.state.favorites.ids().clone(),
            )
        };
        storage.set(&self.storage_key(StorageKeys::CART), &lines);
        storage.set(&self.storage_key(StorageKeys::FAVORITES), &favorites);
    }

    /// Load the persisted cart and favorites. Returns whether anything was
    /// found.
    pub fn restore(&self) -> bool {
        let Some(storage) = &self.storage else {
            return false;
        };
        let lines: Option<Vec<CartLineItem>> = storage.get(&self.storage_key(StorageKeys::CART));
        let favorites: Option<FavoriteSet> = storage.get(&self.storage_key(StorageKeys::FAVORITES));
        let found = lines.is_some() || favorites.is_some();

        let mut shared = self.shared.write();
        if let Some(lines) = lines {
            shared.state.cart.restore(lines);
        }
        if let Some(favorites) = favorites {
            shared.state.favorites.restore(favorites);
        }
        info!(
            cart_lines = shared.state.cart.items().len(),
            favorites = shared.state.favorites.count(),
            "restored local state"
        );
        found
    }

    // --- dispatch / settle ---

    fn begin<R>(&self, key: impl Into<String>, reducer: impl FnOnce(&mut AppState) -> R) -> (Ticket, R) {
        let mut shared = self.shared.write();
        let output = reducer(&mut shared.state);
        let ticket = shared.tracker.issue(key);
        debug!(key = %ticket.key, seq = ticket.seq, "dispatched");
        (ticket, output)
    }

    fn settle_query<T>(
        &self,
        ticket: &Ticket,
        result: Result<T, FetchError>,
        on_ok: impl FnOnce(&mut AppState, T),
        on_err: impl FnOnce(&mut AppState, &FetchError),
        on_stale: impl FnOnce(&mut AppState),
    ) -> Result<(), FetchError> {
        let outcome = {
            let mut shared = self.shared.write();
            if !shared.tracker.settle(ticket) {
                debug!(key = %ticket.key, seq = ticket.seq, "discarding stale response");
                if shared.tracker.is_idle(&ticket.key) {
                    on_stale(&mut shared.state);
                }
                return result.map(drop);
            }
            apply(&mut shared.state, result, on_ok, on_err)
        };
        self.persist_for(ticket);
        outcome
    }

    fn settle_mutation<T>(
        &self,
        ticket: &Ticket,
        result: Result<T, FetchError>,
        on_ok: impl FnOnce(&mut AppState, T),
        on_err: impl FnOnce(&mut AppState, &FetchError),
    ) -> Result<(), FetchError> {
        let outcome = {
            let mut shared = self.shared.write();
            shared.tracker.commit(ticket);
            apply(&mut shared.state, result, on_ok, on_err)
        };
        self.persist_for(ticket);
        outcome
    }

    fn persist_for(&self, ticket: &Ticket) {
        if ticket.key == keys::CART || ticket.key == keys::FAVORITES {
            self.persist();
        }
    }

    async fn products_query(
        &self,
        key: impl Into<String>,
        family: ProductFetch,
        request: impl std::future::Future<Output = Result<Vec<Product>, FetchError>>,
        commit: impl FnOnce(&mut ProductsState, Vec<Product>),
    ) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(key, |s| s.products.begin(family));
        let result = request.await;
        self.settle_query(
            &ticket,
            result,
            |s, products| commit(&mut s.products, products),
            |s, error| {
                s.products
                    .fail(family, error_message(error, family.fallback_error()))
            },
            |s| s.products.abandon(family),
        )
    }

    // --- products ---

    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<(), FetchError> {
        let products = self.api.products();
        self.products_query(
            keys::PRODUCT_ITEMS,
            ProductFetch::List,
            async { products.list(query).await.map(|r| r.data) },
            ProductsState::commit_list,
        )
        .await
    }

    pub async fn fetch_products_by_category(&self, category: &str) -> Result<(), FetchError> {
        let products = self.api.products();
        self.products_query(
            keys::PRODUCT_ITEMS,
            ProductFetch::ByCategory,
            async { products.by_category(category).await.map(|r| r.data) },
            ProductsState::commit_by_category,
        )
        .await
    }

    pub async fn search_products(
        &self,
        query: &str,
        filters: Option<&FilterCriteria>,
    ) -> Result<(), FetchError> {
        let products = self.api.products();
        self.products_query(
            keys::PRODUCT_ITEMS,
            ProductFetch::Search,
            async { products.search(query, filters).await.map(|r| r.data) },
            ProductsState::commit_search,
        )
        .await
    }

    pub async fn fetch_related_products(
        &self,
        id: &ProductId,
        limit: Option<usize>,
    ) -> Result<(), FetchError> {
        let products = self.api.products();
        self.products_query(
            keys::related(id),
            ProductFetch::Related,
            async { products.related(id, limit).await.map(|r| r.data) },
            ProductsState::commit_related,
        )
        .await
    }

    pub async fn fetch_product(&self, id: &ProductId) -> Result<(), FetchError> {
        let family = ProductFetch::Detail;
        let (ticket, ()) = self.begin(keys::product_detail(id), |s| s.products.begin(family));
        let result = self.api.products().get(id).await;
        self.settle_query(
            &ticket,
            result,
            |s, r| s.products.commit_detail(r.data),
            |s, error| {
                s.products
                    .fail(family, error_message(error, family.fallback_error()))
            },
            |s| s.products.abandon(family),
        )
    }

    pub async fn fetch_categories(&self) -> Result<(), FetchError> {
        let family = ProductFetch::Categories;
        let (ticket, ()) = self.begin(keys::CATEGORIES, |s| s.products.begin(family));
        let result = self.api.categories().list().await;
        self.settle_query(
            &ticket,
            result,
            |s, r| s.products.commit_categories(r.data),
            |s, error| {
                s.products
                    .fail(family, error_message(error, family.fallback_error()))
            },
            |s| s.products.abandon(family),
        )
    }

    // --- cart ---

    pub async fn fetch_cart(&self) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::CART, |s| s.cart.begin());
        let result = self.api.cart().list().await;
        self.settle_query(
            &ticket,
            result,
            |s, r| s.cart.commit_fetch(r.data),
            |s, error| s.cart.fail(error_message(error, CartOp::Fetch.fallback_error())),
            |_| {},
        )
    }

    /// Add a line, merging into an existing line for the same product.
    pub async fn add_to_cart(&self, item: NewCartLineItem) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::CART, |s| s.cart.begin());
        let result = self.api.cart().add(&item).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, r| {
                s.cart.commit_add(r.data);
            },
            |s, error| s.cart.fail(error_message(error, CartOp::Add.fallback_error())),
        )
    }

    /// Set a line's quantity; zero or negative removes it.
    pub async fn update_cart_quantity(&self, id: &LineItemId, quantity: i64) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::CART, |s| s.cart.begin());
        let result = self.api.cart().update_quantity(id, quantity).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, r| s.cart.commit_update(id, r.data),
            |s, error| s.cart.fail(error_message(error, CartOp::Update.fallback_error())),
        )
    }

    pub async fn remove_from_cart(&self, id: &LineItemId) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::CART, |s| s.cart.begin());
        let result = self.api.cart().remove(id).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.cart.commit_remove(id),
            |s, error| s.cart.fail(error_message(error, CartOp::Remove.fallback_error())),
        )
    }

    /// Delete every line. A partial failure keeps the local lines and
    /// records the error; refetch to see what the server still holds.
    pub async fn clear_cart(&self) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::CART, |s| s.cart.begin());
        let result = self.api.cart().clear().await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.cart.commit_clear(),
            |s, error| s.cart.fail(error_message(error, CartOp::Clear.fallback_error())),
        )
    }

    /// Show the line at once, then swap in the server's id.
    pub async fn add_to_cart_optimistic(&self, item: NewCartLineItem) -> Result<(), FetchError> {
        let product_id = item.product_id.clone();
        let (ticket, outcome) = self.begin(keys::CART, |s| s.cart.optimistic_add(item.clone()));
        let result = self.api.cart().add(&item).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, r| s.cart.reconcile_add(&outcome, r.data),
            |s, error| {
                s.cart
                    .fail_optimistic(&product_id, error_message(error, CartOp::Add.fallback_error()))
            },
        )
    }

    pub async fn update_cart_quantity_optimistic(
        &self,
        id: &LineItemId,
        quantity: i64,
    ) -> Result<(), FetchError> {
        let (ticket, product_id) =
            self.begin(keys::CART, |s| s.cart.optimistic_update_quantity(id, quantity));
        let Some(product_id) = product_id else {
            self.shared.write().tracker.commit(&ticket);
            return Err(FetchError::Validation(format!("cart line {} not found", id)));
        };
        let result = self.api.cart().update_quantity(id, quantity).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, r| s.cart.reconcile_line(&product_id, r.data),
            |s, error| {
                s.cart.fail_optimistic(
                    &product_id,
                    error_message(error, CartOp::Update.fallback_error()),
                )
            },
        )
    }

    pub async fn remove_from_cart_optimistic(&self, id: &LineItemId) -> Result<(), FetchError> {
        let (ticket, product_id) = self.begin(keys::CART, |s| s.cart.optimistic_remove(id));
        let Some(product_id) = product_id else {
            self.shared.write().tracker.commit(&ticket);
            return Err(FetchError::Validation(format!("cart line {} not found", id)));
        };
        let result = self.api.cart().remove(id).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.cart.confirm(&product_id),
            |s, error| {
                s.cart.fail_optimistic(
                    &product_id,
                    error_message(error, CartOp::Remove.fallback_error()),
                )
            },
        )
    }

    /// Roll a failed optimistic cart change back.
    pub fn revert_cart(&self, product_id: &ProductId) -> bool {
        let reverted = self.dispatch(|s| s.cart.revert(product_id));
        if reverted {
            info!(product_id = %product_id, "reverted cart line");
        }
        reverted
    }

    // --- favorites ---

    pub async fn fetch_favorites(&self) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::FAVORITES, |s| s.favorites.begin());
        let result = self.api.favorites().list().await;
        self.settle_query(
            &ticket,
            result,
            |s, r| s.favorites.commit_fetch(FavoriteSet::from_entries(&r.data)),
            |s, error| {
                s.favorites
                    .fail(error_message(error, FavoritesOp::Fetch.fallback_error()))
            },
            |_| {},
        )
    }

    /// Fetch the products behind every favorite. The favorite set becomes
    /// the ids of the products found.
    pub async fn fetch_favorite_products(&self) -> Result<Vec<Product>, FetchError> {
        let (ticket, ()) = self.begin(keys::FAVORITES, |s| s.favorites.begin());
        let result = self.api.favorites().favorite_products().await;
        let products = result.as_ref().map(|r| r.data.clone()).unwrap_or_default();
        self.settle_query(
            &ticket,
            result,
            |s, r| {
                let mut ids = FavoriteSet::new();
                for product in r.data {
                    ids.insert(product.id);
                }
                s.favorites.commit_fetch(ids);
            },
            |s, error| {
                s.favorites
                    .fail(error_message(error, FavoritesOp::FetchProducts.fallback_error()))
            },
            |_| {},
        )?;
        Ok(products)
    }

    pub async fn add_favorite(&self, product_id: &ProductId) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::FAVORITES, |s| s.favorites.begin());
        let result = self.api.favorites().add(product_id).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.favorites.commit_add(product_id.clone()),
            |s, error| {
                s.favorites
                    .fail(error_message(error, FavoritesOp::Add.fallback_error()))
            },
        )
    }

    pub async fn remove_favorite(&self, product_id: &ProductId) -> Result<(), FetchError> {
        let (ticket, ()) = self.begin(keys::FAVORITES, |s| s.favorites.begin());
        let result = self.api.favorites().remove(product_id).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.favorites.commit_remove(product_id),
            |s, error| {
                s.favorites
                    .fail(error_message(error, FavoritesOp::Remove.fallback_error()))
            },
        )
    }

    /// Flip a product's membership. The direction is decided from local
    /// state at dispatch. Returns whether the product is now a favorite.
    pub async fn toggle_favorite(&self, product_id: &ProductId) -> Result<bool, FetchError> {
        let (ticket, action) = self.begin(keys::FAVORITES, |s| {
            s.favorites.begin();
            if s.favorites.is_favorite(product_id) {
                ToggleAction::Remove
            } else {
                ToggleAction::Add
            }
        });
        let result = self.send_toggle(product_id, action).await;
        self.settle_mutation(
            &ticket,
            result,
            |s, _| s.favorites.commit_toggle(product_id.clone(), action),
            |s, error| {
                s.favorites
                    .fail(error_message(error, FavoritesOp::Toggle.fallback_error()))
            },
        )?;
        Ok(action == ToggleAction::Add)
    }

    async fn send_toggle(&self, product_id: &ProductId, action: ToggleAction) -> Result<(), FetchError> {
        let favorites = self.api.favorites();
        match action {
            ToggleAction::Add => favorites.add(product_id).await.map(drop),
            ToggleAction::Remove => favorites.remove(product_id).await.map(drop),
        }
    }

    /// Flip membership at once, then confirm with the server.
    pub async fn toggle_favorite_optimistic(&self, product_id: &ProductId) -> Result<bool, FetchError> {
        let (ticket, action) =
            self.begin(keys::FAVORITES, |s| s.favorites.optimistic_toggle(product_id.clone()));
        let result = self.send_toggle(product_id, action).await;
        self.settle_optimistic_favorite(&ticket, product_id, result, FavoritesOp::Toggle)?;
        Ok(action == ToggleAction::Add)
    }

    pub async fn add_favorite_optimistic(&self, product_id: &ProductId) -> Result<(), FetchError> {
        let (ticket, ()) =
            self.begin(keys::FAVORITES, |s| s.favorites.optimistic_add(product_id.clone()));
        let result = self.send_toggle(product_id, ToggleAction::Add).await;
        self.settle_optimistic_favorite(&ticket, product_id, result, FavoritesOp::Add)
    }

    pub async fn remove_favorite_optimistic(&self, product_id: &ProductId) -> Result<(), FetchError> {
        let (ticket, ()) =
            self.begin(keys::FAVORITES, |s| s.favorites.optimistic_remove(product_id));
        let result = self.send_toggle(product_id, ToggleAction::Remove).await;
        self.settle_optimistic_favorite(&ticket, product_id, result, FavoritesOp::Remove)
    }

    fn settle_optimistic_favorite(
        &self,
        ticket: &Ticket,
        product_id: &ProductId,
        result: Result<(), FetchError>,
        op: FavoritesOp,
    ) -> Result<(), FetchError> {
        self.settle_mutation(
            ticket,
            result,
            |s, ()| s.favorites.confirm(product_id),
            |s, error| {
                warn!(product_id = %product_id, %error, "optimistic favorite change rejected");
                s.favorites
                    .fail_optimistic(product_id, error_message(error, op.fallback_error()))
            },
        )
    }

    /// Roll a failed optimistic favorite change back.
    pub fn revert_favorite(&self, product_id: &ProductId) -> bool {
        self.dispatch(|s| s.favorites.revert(product_id))
    }
}

fn apply<T>(
    state: &mut AppState,
    result: Result<T, FetchError>,
    on_ok: impl FnOnce(&mut AppState, T),
    on_err: impl FnOnce(&mut AppState, &FetchError),
) -> Result<(), FetchError> {
    match result {
        Ok(value) => {
            on_ok(state, value);
            Ok(())
        }
        Err(error) => {
            on_err(state, &error);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_cache::MemoryBackend;
    use storefront_data::mock::MockBackend;
    use storefront_data::FetchClient;

    fn storefront(mock: &MockBackend) -> Storefront {
        let client = FetchClient::with_transport(mock.clone()).with_base_url("http://localhost:3001");
        Storefront::new(ApiGateway::new(client))
    }

    #[test]
    fn test_error_message_fallback() {
        let error = FetchError::Rejected(String::new());
        assert_eq!(error_message(&error, "Failed to fetch cart items"), "Failed to fetch cart items");
        let error = FetchError::Rejected("out of stock".to_string());
        assert_eq!(error_message(&error, "Failed to add item to cart"), "out of stock");
    }

    #[test]
    fn test_dispatch_and_read() {
        let store = storefront(&MockBackend::new());
        store.dispatch(|s| s.cart.toggle_open());
        assert!(store.read(|s| s.cart.is_open()));
        assert!(store.snapshot().cart.is_open());
    }

    #[tokio::test]
    async fn test_persists_and_restores_cart() {
        let mock = MockBackend::new();
        let storage = Storage::new(MemoryBackend::new());

        let store = storefront(&mock).with_storage(storage.clone());
        store
            .add_to_cart(NewCartLineItem::new("p1", 2, 10.0).unwrap())
            .await
            .unwrap();
        store.add_favorite(&ProductId::new("p1")).await.unwrap();
        assert!(storage.keys().unwrap().contains(&"ecommerce_cart:1".to_string()));

        let fresh = storefront(&mock).with_storage(storage);
        assert!(fresh.restore());
        assert_eq!(fresh.read(|s| s.cart.total_items()), 2);
        assert!(fresh.read(|s| s.favorites.is_favorite(&ProductId::new("p1"))));
    }

    #[test]
    fn test_restore_without_storage() {
        let store = storefront(&MockBackend::new());
        assert!(!store.restore());
    }
}
