//! Read-only view model over the feed state.

use crate::feed::{FeedMachine, FetchMode};
use foodify_domain::{Category, FeedPhase, FetchErrorKind, ProductSummary, Query};
use serde::Serialize;

/// Stable snapshot handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Query the list belongs to.
    pub query: Query,
    /// Deduplicated result list.
    pub products: Vec<ProductSummary>,
    /// A request is in flight.
    pub loading: bool,
    /// A new search is debouncing or in flight.
    pub is_searching: bool,
    /// Kind-specific error message.
    pub error: Option<Box<str>>,
    /// Classified error kind.
    pub error_kind: Option<FetchErrorKind>,
    /// Whether another page may exist.
    pub has_more: bool,
    /// Pages merged so far.
    pub page: u32,
    /// Raw machine phase.
    pub phase: FeedPhase,
    /// Categories for filter pickers.
    pub categories: Vec<Category>,
}

impl FeedSnapshot {
    pub(crate) fn from_machine(machine: &FeedMachine) -> Self {
        let phase = machine.phase();
        let replacing = machine.in_flight_mode() == Some(FetchMode::Replace);
        let error = machine.error();
        Self {
            query: machine.query().clone(),
            products: machine.products().to_vec(),
            loading: matches!(phase, FeedPhase::Fetching { .. }),
            is_searching: match phase {
                FeedPhase::DebouncePending { .. } => true,
                FeedPhase::Fetching { .. } => replacing,
                FeedPhase::Idle | FeedPhase::Error => false,
            },
            error: error.map(|error| error.message.clone()),
            error_kind: error.map(|error| error.kind),
            has_more: machine.has_more(),
            page: machine.pages_loaded(),
            phase,
            categories: machine.categories().to_vec(),
        }
    }
}
