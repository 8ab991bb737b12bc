//! Timeout helpers with cancellation awareness.

use crate::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::future::Future;
use std::time::Duration;

/// Apply a timeout to a future, honoring request cancellation.
///
/// Cancellation wins over the timeout and drops `fut`, which aborts any I/O it owns.
pub async fn timeout_with_context<T, F>(
    ctx: &RequestContext,
    timeout: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ctx.ensure_not_cancelled(operation)?;

    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(cancelled_error(operation)),
        res = tokio::time::timeout(timeout, fut) => {
            res.unwrap_or_else(|_| Err(timeout_error(operation, timeout)))
        }
    }
}

fn timeout_error(operation: &'static str, timeout: Duration) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::timeout(),
        format!("operation timed out: {operation}"),
        ErrorClass::Retriable,
    )
    .with_metadata("operation", operation)
    .with_metadata("timeoutMs", timeout.as_millis().to_string())
}

fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}
