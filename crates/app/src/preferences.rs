//! Cart and theme persistence use cases.
//!
//! Both values are loaded on demand and written back on every change.

use foodify_domain::{Cart, CartItem, Theme};
use foodify_ports::{CART_KEY, LoggerPort, PreferenceStorePort, THEME_KEY, log_fields};
use foodify_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::json;
use std::sync::Arc;

/// Dependencies required by the preference use cases.
#[derive(Clone)]
pub struct PreferencesDeps {
    /// Key-value store.
    pub store: Arc<dyn PreferenceStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Load the cart. Missing or unreadable entries yield an empty cart.
pub async fn load_cart(ctx: &RequestContext, deps: &PreferencesDeps) -> Result<Cart> {
    let Some(raw) = deps.store.get(ctx, CART_KEY).await? else {
        return Ok(Cart::default());
    };
    match serde_json::from_str::<Vec<CartItem>>(&raw) {
        Ok(items) => Ok(Cart::from_items(items)),
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.warn(
                    "prefs.cart.invalid",
                    "Stored cart is unreadable; starting empty",
                    Some(log_fields([("error", json!(error.to_string()))])),
                );
            }
            Ok(Cart::default())
        },
    }
}

/// Persist the cart as a JSON array.
pub async fn save_cart(ctx: &RequestContext, deps: &PreferencesDeps, cart: &Cart) -> Result<()> {
    let encoded = serde_json::to_string(cart).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to encode cart: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    deps.store.set(ctx, CART_KEY, encoded).await
}

/// Load, modify and persist the cart in one step.
pub async fn update_cart<F>(ctx: &RequestContext, deps: &PreferencesDeps, change: F) -> Result<Cart>
where
    F: FnOnce(&mut Cart) + Send,
{
    let mut cart = load_cart(ctx, deps).await?;
    change(&mut cart);
    save_cart(ctx, deps, &cart).await?;
    Ok(cart)
}

/// Load the theme, defaulting to light.
pub async fn load_theme(ctx: &RequestContext, deps: &PreferencesDeps) -> Result<Theme> {
    let stored = deps.store.get(ctx, THEME_KEY).await?;
    Ok(stored
        .and_then(|raw| raw.parse::<Theme>().ok())
        .unwrap_or_default())
}

/// Persist the theme.
pub async fn save_theme(ctx: &RequestContext, deps: &PreferencesDeps, theme: Theme) -> Result<()> {
    deps.store
        .set(ctx, THEME_KEY, theme.as_str().to_owned())
        .await
}

/// Flip between light and dark and persist the result.
pub async fn toggle_theme(ctx: &RequestContext, deps: &PreferencesDeps) -> Result<Theme> {
    let theme = load_theme(ctx, deps).await?.toggled();
    save_theme(ctx, deps, theme).await?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_adapters::MemoryPreferenceStore;
    use foodify_domain::{ProductId, ProductSummary};

    fn deps(store: &Arc<MemoryPreferenceStore>) -> PreferencesDeps {
        PreferencesDeps {
            store: store.clone(),
            logger: None,
        }
    }

    fn item(id: &str) -> Result<CartItem> {
        let mut product = ProductSummary::new(ProductId::parse(id)?);
        product.name = Some("Rice cakes".into());
        Ok(CartItem::from_product(&product))
    }

    #[tokio::test]
    async fn cart_changes_are_written_through() -> Result<()> {
        let store = Arc::new(MemoryPreferenceStore::default());
        let deps = deps(&store);
        let ctx = RequestContext::new_request();

        let first = item("111")?;
        let again = first.clone();
        update_cart(&ctx, &deps, |cart| cart.add(first)).await?;
        let cart = update_cart(&ctx, &deps, |cart| cart.add(again)).await?;
        assert_eq!(cart.total_items(), 2);

        let stored = store.values().get(CART_KEY).cloned().unwrap_or_default();
        let decoded: serde_json::Value = serde_json::from_str(&stored).unwrap_or_default();
        assert_eq!(decoded[0]["quantity"], json!(2));

        let id = ProductId::parse("111")?;
        let cart = update_cart(&ctx, &deps, |cart| {
            cart.update_quantity(&id, 0);
        })
        .await?;
        assert!(cart.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_cart_starts_empty() -> Result<()> {
        let store = Arc::new(MemoryPreferenceStore::default());
        let ctx = RequestContext::new_request();
        store.set(&ctx, CART_KEY, "{not json".to_owned()).await?;

        assert!(load_cart(&ctx, &deps(&store)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn theme_defaults_to_light_and_toggles() -> Result<()> {
        let store = Arc::new(MemoryPreferenceStore::default());
        let deps = deps(&store);
        let ctx = RequestContext::new_request();

        assert_eq!(load_theme(&ctx, &deps).await?, Theme::Light);
        assert_eq!(toggle_theme(&ctx, &deps).await?, Theme::Dark);
        assert_eq!(store.values().get(THEME_KEY).map(String::as_str), Some("dark"));
        assert_eq!(toggle_theme(&ctx, &deps).await?, Theme::Light);
        Ok(())
    }
}
