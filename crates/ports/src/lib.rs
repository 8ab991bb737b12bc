//! # foodify-ports
//!
//! Port traits for the foodify hexagonal architecture.
//!
//! This crate defines the interfaces between the application core and the
//! outside world (catalog API, connectivity, logging, preference storage).
//! It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod catalog;
pub mod connectivity;
pub mod logger;
pub mod preferences;

pub use catalog::*;
pub use connectivity::*;
pub use logger::*;
pub use preferences::*;

// Re-export domain types used in port signatures.
pub use foodify_domain::{Category, CategoryId, ProductId, ProductSummary, SortKey};
