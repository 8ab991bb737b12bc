//! Cart and theme handlers.

use crate::CliOutput;
use crate::context::CliContext;
use crate::error::CliError;
use crate::format::{self, OutputMode};
use foodify_app::{fetch_product_details, load_cart, load_theme, save_theme, toggle_theme, update_cart};
use foodify_domain::{Cart, CartItem, ProductId, Theme};
use foodify_shared::RequestContext;
use serde_json::json;

/// Cart operations.
#[derive(Debug, Clone)]
pub enum CartAction {
    List,
    Add(ProductId),
    Remove(ProductId),
    Set(ProductId, i64),
    Clear,
}

/// Theme operations.
#[derive(Debug, Clone, Copy)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set(Theme),
}

/// Run a cart operation and print the resulting cart.
pub async fn run_cart(
    ctx: &CliContext,
    mode: OutputMode,
    action: CartAction,
) -> Result<CliOutput, CliError> {
    let request = RequestContext::new_request();
    let deps = ctx.preferences();

    let cart = match action {
        CartAction::List => load_cart(&request, &deps).await?,
        CartAction::Add(id) => {
            let details = ctx.details()?;
            let product = match fetch_product_details(&request, &details, id).await {
                Ok(product) => product,
                Err(error) => return Ok(format::failure(mode, &error)),
            };
            let item = CartItem::from_product(&product);
            update_cart(&request, &deps, |cart| cart.add(item)).await?
        },
        CartAction::Remove(id) => {
            update_cart(&request, &deps, |cart| {
                cart.remove(&id);
            })
            .await?
        },
        CartAction::Set(id, quantity) => {
            update_cart(&request, &deps, |cart| {
                cart.update_quantity(&id, quantity);
            })
            .await?
        },
        CartAction::Clear => update_cart(&request, &deps, Cart::clear).await?,
    };

    let total = cart.total_items();
    let payload = json!({ "items": cart.items(), "totalItems": total });
    format::success(mode, &payload, || format::cart_lines(cart.items(), total))
}

/// Run a theme operation and print the active theme.
pub async fn run_theme(
    ctx: &CliContext,
    mode: OutputMode,
    action: ThemeAction,
) -> Result<CliOutput, CliError> {
    let request = RequestContext::new_request();
    let deps = ctx.preferences();

    let theme = match action {
        ThemeAction::Show => load_theme(&request, &deps).await?,
        ThemeAction::Toggle => toggle_theme(&request, &deps).await?,
        ThemeAction::Set(theme) => {
            save_theme(&request, &deps, theme).await?;
            theme
        },
    };
    format::success(mode, &json!({ "theme": theme }), || format!("{theme}\n"))
}
