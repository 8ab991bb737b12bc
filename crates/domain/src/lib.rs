//! # foodify-domain
//!
//! Catalog domain model with no infrastructure dependencies:
//!
//! - **Primitives** - `ProductId`, `CategoryId`
//! - **Products** - `ProductSummary`, `NutritionGrade`, `NutritionFacts`
//! - **Queries** - `Query`, `SortKey`, `PageRequest`, `QueryRoute`
//! - **Categories** - `Category` and the meat classifier
//! - **Failures** - `FetchErrorKind`
//! - **State** - `FeedPhase`
//! - **Preferences** - `Cart`, `CartItem`, `Theme`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use foodify_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod cart;
pub mod category;
pub mod failure;
pub mod primitives;
pub mod product;
pub mod query;
pub mod states;

pub use cart::{Cart, CartItem, Theme, UnknownTheme};
pub use category::{Category, is_meat_related};
pub use failure::{FetchErrorKind, network_unavailable_code, network_unavailable_error};
pub use primitives::{CategoryId, PrimitiveError, ProductId};
pub use product::{
    INGREDIENTS_UNAVAILABLE, NON_VEGETARIAN_TAG, NutritionFacts, NutritionGrade, ProductSummary,
    UNKNOWN_PRODUCT_NAME, compare_grades,
};
pub use query::{PageRequest, Query, QueryRoute, SortKey, UnknownSortKey};
pub use states::FeedPhase;

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_versions_match() {
        assert_eq!(domain_crate_version(), shared_crate_version());
    }
}
