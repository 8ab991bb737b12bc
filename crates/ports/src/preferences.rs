//! Key-value preference storage boundary contract.

use crate::BoxFuture;
use foodify_shared::{RequestContext, Result};

/// Storage key for the serialized cart.
pub const CART_KEY: &str = "foodify-cart";

/// Storage key for the theme name.
pub const THEME_KEY: &str = "foodify-theme";

/// Boundary contract for small string preferences.
pub trait PreferenceStorePort: Send + Sync {
    /// Read a value; `Ok(None)` when unset.
    fn get(&self, ctx: &RequestContext, key: &str) -> BoxFuture<'_, Result<Option<String>>>;

    /// Write a value, replacing any previous one.
    fn set(&self, ctx: &RequestContext, key: &str, value: String) -> BoxFuture<'_, Result<()>>;
}
