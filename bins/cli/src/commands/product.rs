//! Product details and category listing handlers.

use crate::CliOutput;
use crate::context::CliContext;
use crate::error::CliError;
use crate::format::{self, OutputMode};
use foodify_app::fetch_product_details;
use foodify_domain::ProductId;
use foodify_shared::RequestContext;

/// Show one product with nutrition facts.
pub async fn run_product(
    ctx: &CliContext,
    mode: OutputMode,
    id: ProductId,
) -> Result<CliOutput, CliError> {
    let deps = ctx.details()?;
    match fetch_product_details(&RequestContext::new_request(), &deps, id).await {
        Ok(product) => format::success(mode, &product, || format::product_details(&product)),
        Err(error) => Ok(format::failure(mode, &error)),
    }
}

/// List popular categories.
pub async fn run_categories(ctx: &CliContext, mode: OutputMode) -> Result<CliOutput, CliError> {
    let catalog = ctx.catalog()?;
    let categories = catalog
        .list_categories(&RequestContext::new_request())
        .await?;
    format::success(mode, &categories, || format::category_lines(&categories))
}
