//! Remote catalog boundary contract.

use crate::BoxFuture;
use foodify_domain::{
    Category, CategoryId, PageRequest, ProductId, ProductSummary, Query, SortKey,
};
use foodify_shared::{RequestContext, Result};

/// Full-text search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Trimmed search terms; `None` lists everything.
    pub terms: Option<Box<str>>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Ordering.
    pub sort: SortKey,
    /// Restrict to a category.
    pub category: Option<CategoryId>,
    /// Restrict to vegetarian ingredient analysis.
    pub veg_only: bool,
}

impl SearchRequest {
    /// Build a search request for a page of `query`.
    #[must_use]
    pub fn for_page(request: &PageRequest) -> Self {
        let query: &Query = &request.query;
        Self {
            terms: query.search_terms().map(Into::into),
            page: request.page,
            page_size: request.page_size,
            sort: query.sort,
            category: query.category.clone(),
            veg_only: query.veg_only,
        }
    }
}

/// Category listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    /// Category to list.
    pub category: CategoryId,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Ordering.
    pub sort: SortKey,
}

/// One page of upstream results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    /// Products in upstream order.
    pub products: Vec<ProductSummary>,
    /// Total match count when the upstream reports it.
    pub total: Option<u64>,
}

/// Boundary contract for the remote product catalog.
///
/// Implementations honor `ctx` cancellation by dropping the underlying request.
/// Cancellation surfaces as a `core:cancelled` error and is never retried.
pub trait CatalogPort: Send + Sync {
    /// Fetch a single product; `Ok(None)` when it does not exist.
    fn lookup_by_id(
        &self,
        ctx: &RequestContext,
        id: ProductId,
    ) -> BoxFuture<'_, Result<Option<ProductSummary>>>;

    /// Full-text search page.
    fn search(&self, ctx: &RequestContext, request: SearchRequest)
    -> BoxFuture<'_, Result<CatalogPage>>;

    /// Category listing page.
    fn browse_category(
        &self,
        ctx: &RequestContext,
        request: BrowseRequest,
    ) -> BoxFuture<'_, Result<CatalogPage>>;

    /// Popular categories for filter pickers.
    ///
    /// Failures other than cancellation yield an empty list.
    fn list_categories(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Category>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_shared::ErrorEnvelope;

    #[test]
    fn search_request_copies_query_filters() -> Result<()> {
        let query = Query {
            text: "  oat milk ".into(),
            category: Some(CategoryId::parse("en:plant-based-milks").map_err(ErrorEnvelope::from)?),
            sort: SortKey::Grade,
            veg_only: true,
        };
        let page = PageRequest::new(query, 2, 24).map_err(ErrorEnvelope::from)?;
        let request = SearchRequest::for_page(&page);

        assert_eq!(request.terms.as_deref(), Some("oat milk"));
        assert_eq!(request.page, 2);
        assert_eq!(request.sort, SortKey::Grade);
        assert!(request.veg_only);
        assert!(request.category.is_some());
        Ok(())
    }
}
