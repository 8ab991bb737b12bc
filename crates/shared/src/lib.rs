//! # foodify-shared
//!
//! Shared result types, error handling, and async plumbing for the foodify workspace.
//!
//! This crate provides foundational types used by every other crate:
//!
//! - Result and error envelope types
//! - Request context with cooperative cancellation
//! - Retry (exponential backoff) and per-attempt timeout helpers
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Error envelopes serialize for CLI/JSON output

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod concurrency;
pub mod errors;
pub mod result;
pub mod retry;
pub mod timeout;

pub use concurrency::{CancellationToken, CorrelationId, RequestContext};
pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use result::Result;
pub use retry::{RetryPolicy, retry_async_with_observer};
pub use timeout::timeout_with_context;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
