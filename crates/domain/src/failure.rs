//! Fetch failure taxonomy and user-facing messages.

use foodify_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code reported when the network cannot be reached.
#[must_use]
pub fn network_unavailable_code() -> ErrorCode {
    ErrorCode::new("catalog", "network_unavailable")
}

/// Retriable envelope for an unreachable network.
pub fn network_unavailable_error(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(network_unavailable_code(), message, ErrorClass::Retriable)
}

/// Classified reason a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// No connectivity.
    NetworkUnavailable,
    /// An attempt exceeded its time budget.
    Timeout,
    /// Upstream throttling.
    RateLimited,
    /// Upstream 5xx.
    ServerError,
    /// Lookup miss.
    NotFound,
    /// Superseded fetch; never shown to the user.
    Canceled,
    /// Anything else.
    Unknown,
}

impl FetchErrorKind {
    /// Map an error envelope onto the taxonomy by its code.
    #[must_use]
    pub fn classify(error: &ErrorEnvelope) -> Self {
        match error.code.code() {
            "cancelled" => Self::Canceled,
            "timeout" => Self::Timeout,
            "network_unavailable" => Self::NetworkUnavailable,
            "rate_limited" => Self::RateLimited,
            "dependency_unavailable" => Self::ServerError,
            "not_found" => Self::NotFound,
            _ => Self::Unknown,
        }
    }

    /// Kind-specific, human readable message.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::NetworkUnavailable => {
                "You appear to be offline. Check your connection and try again."
            },
            Self::Timeout => "The food database took too long to respond. Please try again.",
            Self::RateLimited => {
                "The food database is receiving too many requests. Please wait a moment and try again."
            },
            Self::ServerError => {
                "The OpenFoodFacts API might be busy right now. Please try again."
            },
            Self::NotFound => "Product not found.",
            Self::Canceled => "The request was cancelled.",
            Self::Unknown => "Failed to load products. Please try again.",
        }
    }

    /// Returns true when the failure must reach the view model.
    #[must_use]
    pub const fn is_user_visible(self) -> bool {
        !matches!(self, Self::Canceled)
    }

    /// Stable snake case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkUnavailable => "network_unavailable",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_onto_kinds() {
        let cases = [
            (ErrorCode::cancelled(), FetchErrorKind::Canceled),
            (ErrorCode::timeout(), FetchErrorKind::Timeout),
            (ErrorCode::rate_limited(), FetchErrorKind::RateLimited),
            (ErrorCode::dependency_unavailable(), FetchErrorKind::ServerError),
            (ErrorCode::not_found(), FetchErrorKind::NotFound),
            (network_unavailable_code(), FetchErrorKind::NetworkUnavailable),
            (ErrorCode::new("catalog", "http_error"), FetchErrorKind::Unknown),
            (ErrorCode::internal(), FetchErrorKind::Unknown),
        ];
        for (code, expected) in cases {
            let error = ErrorEnvelope::unexpected(code, "x", ErrorClass::NonRetriable);
            assert_eq!(FetchErrorKind::classify(&error), expected);
        }
    }

    #[test]
    fn messages_differ_per_kind() {
        assert_ne!(
            FetchErrorKind::Timeout.user_message(),
            FetchErrorKind::RateLimited.user_message()
        );
        assert!(FetchErrorKind::Timeout.user_message().contains("too long"));
        assert!(!FetchErrorKind::Canceled.is_user_visible());
    }
}
