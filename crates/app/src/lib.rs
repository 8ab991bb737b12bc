//! # foodify-app
//!
//! Application use cases: the product feed (state machine, async driver and
//! view model), result post-processing, product details, cart and theme.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod feed;
pub mod post_process;
pub mod preferences;
pub mod product_details;
pub mod view;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use feed::{
    FeedDeps, FeedError, FeedMachine, FeedSettings, FetchMode, FetchPlan, LoadMoreRejection,
    ProductFeed,
};
pub use post_process::clean_page;
pub use preferences::{
    PreferencesDeps, load_cart, load_theme, save_cart, save_theme, toggle_theme, update_cart,
};
pub use product_details::{ProductDetailsDeps, fetch_product_details};
pub use view::FeedSnapshot;

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_domain::domain_crate_version;
    use foodify_ports::ports_crate_version;
    use foodify_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        assert_eq!(app_crate_version(), ports_crate_version());
        assert_eq!(app_crate_version(), domain_crate_version());
        assert_eq!(app_crate_version(), shared_crate_version());
    }
}
