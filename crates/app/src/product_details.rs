//! Product details use case.

use foodify_domain::{FetchErrorKind, ProductId, ProductSummary};
use foodify_ports::{CatalogPort, LoggerPort, log_fields};
use foodify_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::json;
use std::sync::Arc;

/// Dependencies required by the details lookup.
#[derive(Clone)]
pub struct ProductDetailsDeps {
    /// Remote catalog.
    pub catalog: Arc<dyn CatalogPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Fetch one product with its nutrition facts.
///
/// A missing product is reported as `core:not_found`.
#[tracing::instrument(name = "product_details", skip_all, fields(product_id = %id))]
pub async fn fetch_product_details(
    ctx: &RequestContext,
    deps: &ProductDetailsDeps,
    id: ProductId,
) -> Result<ProductSummary> {
    let result = match deps.catalog.lookup_by_id(ctx, id.clone()).await {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ErrorEnvelope::expected(
            ErrorCode::not_found(),
            "Product not found",
        )
        .with_metadata("productId", id.as_str())),
        Err(error) => Err(error),
    };

    if let Err(error) = result.as_ref()
        && !error.is_cancelled()
        && let Some(logger) = deps.logger.as_ref()
    {
        let kind = FetchErrorKind::classify(error);
        logger.warn(
            "details.lookup.failed",
            "Product lookup failed",
            Some(log_fields([
                ("productId", json!(id.as_str())),
                ("kind", json!(kind.as_str())),
            ])),
        );
    }
    result
}
