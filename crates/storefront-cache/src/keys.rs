//! Well-known storage keys.

/// Keys the storefront persists under.
pub struct StorageKeys;

impl StorageKeys {
    /// Cart line snapshot.
    pub const CART: &'static str = "ecommerce_cart";
    /// Favorite product ids.
    pub const FAVORITES: &'static str = "ecommerce_favorites";
    /// User preferences.
    pub const USER_PREFERENCES: &'static str = "ecommerce_user_preferences";
    /// Theme name.
    pub const THEME: &'static str = "ecommerce_theme";
    /// Language code.
    pub const LANGUAGE: &'static str = "ecommerce_language";
}

/// Helper to build storage keys with namespacing.
///
/// # Example
///
/// ```rust
/// use storefront_cache::{storage_key, StorageKeys};
///
/// let key = storage_key!(StorageKeys::CART, "user1");
/// assert_eq!(key, "ecommerce_cart:user1");
/// ```
#[macro_export]
macro_rules! storage_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
