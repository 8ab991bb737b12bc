//! Search command handler.

use crate::CliOutput;
use crate::context::CliContext;
use crate::error::CliError;
use crate::format::{self, OutputMode};
use foodify_app::FeedSnapshot;
use foodify_domain::{CategoryId, FetchErrorKind, SortKey};
use foodify_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::fmt::Write;

/// Inputs for search command execution.
pub struct SearchCommandInput {
    pub text: String,
    pub category: Option<CategoryId>,
    pub sort: SortKey,
    pub veg_only: bool,
    pub pages: u32,
}

/// Run the search through the product feed, paging until `pages` are loaded
/// or the feed reports no more results.
pub async fn run_search(
    ctx: &CliContext,
    mode: OutputMode,
    input: SearchCommandInput,
) -> Result<CliOutput, CliError> {
    let feed = ctx.feed()?;
    feed.set_sort_by(input.sort);
    feed.set_veg_only(input.veg_only);
    feed.set_selected_category(input.category);
    feed.set_search_query(input.text);
    feed.force_search();

    let mut snapshot = feed.settled().await?;
    for _ in 1..input.pages.max(1) {
        if !feed.load_more() {
            break;
        }
        snapshot = feed.settled().await?;
    }

    if snapshot.products.is_empty()
        && let Some(error) = feed_error(&snapshot)
    {
        return Ok(format::failure(mode, &error));
    }

    let mut output = format::success(mode, &snapshot, || {
        let mut text = format::product_lines(&snapshot.products);
        let more = if snapshot.has_more {
            ", more available"
        } else {
            ""
        };
        let _ = writeln!(
            text,
            "{} products, {} page(s){more}",
            snapshot.products.len(),
            snapshot.page
        );
        text
    })?;
    if let Some(message) = snapshot.error.as_deref() {
        output.stderr = format!("warning: {message}\n");
    }
    Ok(output)
}

fn feed_error(snapshot: &FeedSnapshot) -> Option<ErrorEnvelope> {
    let message = snapshot.error.as_deref()?;
    let kind = snapshot.error_kind.unwrap_or(FetchErrorKind::Unknown);
    Some(ErrorEnvelope::unexpected(
        ErrorCode::new("feed", kind.as_str()),
        message,
        ErrorClass::NonRetriable,
    ))
}
