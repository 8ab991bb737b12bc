//! Feed lifecycle states.

use serde::{Deserialize, Serialize};

/// Phase of the query/pagination state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A page-1 fetch is waiting for the input to settle.
    DebouncePending {
        /// Request token of the scheduled fetch.
        token: u64,
    },
    /// A fetch is in flight.
    Fetching {
        /// Request token of the in-flight fetch.
        token: u64,
    },
    /// The last page-1 fetch failed.
    Error,
}

impl FeedPhase {
    /// Token of the scheduled or in-flight fetch, if any.
    #[must_use]
    pub const fn token(self) -> Option<u64> {
        match self {
            Self::DebouncePending { token } | Self::Fetching { token } => Some(token),
            Self::Idle | Self::Error => None,
        }
    }

    /// Returns true while a fetch is scheduled or running.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        self.token().is_some()
    }
}
