//! Command handlers for the CLI.

mod prefs;
mod product;
mod search;

pub use prefs::{CartAction, ThemeAction, run_cart, run_theme};
pub use product::{run_categories, run_product};
pub use search::{SearchCommandInput, run_search};
