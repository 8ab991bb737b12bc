//! Open Food Facts catalog adapter.

use super::wire::{CategoryListPayload, ListingPayload, LookupPayload};
use foodify_config::ValidatedCatalogConfig;
use foodify_domain::{ProductId, ProductSummary, SortKey, network_unavailable_error};
use foodify_ports::{BoxFuture, BrowseRequest, CatalogPage, CatalogPort, Category, SearchRequest};
use foodify_shared::{
    ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result, RetryPolicy,
    retry_async_with_observer, timeout_with_context,
};
use reqwest::StatusCode;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const VEGETARIAN_TAG: &str = "en:vegetarian";
const NUTRITION_COMPLETED_TAG: &str = "en:nutrition-facts-completed";

/// Catalog adapter backed by the Open Food Facts HTTP API.
///
/// Every attempt gets its own timeout budget; retriable failures (timeouts,
/// connection errors, 408/429/5xx) are retried with exponential backoff.
/// Cancelling the request context drops the in-flight request.
pub struct OpenFoodFactsCatalog {
    client: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    retry: RetryPolicy,
    min_category_products: u64,
    max_categories: usize,
}

impl OpenFoodFactsCatalog {
    /// Create a client from a validated config.
    pub fn new(config: &ValidatedCatalogConfig) -> Result<Self> {
        let raw = config.as_config();
        let base_url = Url::parse(&raw.client.base_url).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                format!("invalid catalog base url: {error}"),
            )
        })?;

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&raw.client.user_agent).map_err(|_| {
            ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "user agent contains invalid header characters",
            )
        })?;
        headers.insert(USER_AGENT, user_agent);
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("catalog", "client_init_failed"),
                    format!("failed to build catalog client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url,
            request_timeout: config.request_timeout(),
            retry: config.retry_policy(),
            min_category_products: raw.categories.min_products,
            max_categories: usize::try_from(raw.categories.max_count).unwrap_or(usize::MAX),
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ErrorEnvelope::invariant(ErrorCode::internal(), "catalog base url cannot be a base")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self, request: &SearchRequest) -> Result<Url> {
        let mut url = self.endpoint(["cgi", "search.pl"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(terms) = request.terms.as_deref() {
                pairs.append_pair("search_terms", terms);
            }
            pairs
                .append_pair("search_simple", "1")
                .append_pair("action", "process")
                .append_pair("json", "1")
                .append_pair("page", &request.page.to_string())
                .append_pair("page_size", &request.page_size.to_string())
                .append_pair("sort_by", request.sort.api_key());

            let mut clauses: Vec<(&str, &str)> = Vec::new();
            if let Some(category) = request.category.as_ref() {
                clauses.push(("categories", category.as_str()));
            }
            if request.veg_only {
                clauses.push(("ingredients_analysis", VEGETARIAN_TAG));
            }
            if request.sort == SortKey::Grade {
                clauses.push(("states", NUTRITION_COMPLETED_TAG));
            }
            for (index, (tag_type, tag)) in clauses.into_iter().enumerate() {
                pairs
                    .append_pair(&format!("tagtype_{index}"), tag_type)
                    .append_pair(&format!("tag_contains_{index}"), "contains")
                    .append_pair(&format!("tag_{index}"), tag);
            }
        }
        Ok(url)
    }

    fn browse_url(&self, request: &BrowseRequest) -> Result<Url> {
        let file = format!("{}.json", request.category.as_str());
        let mut url = self.endpoint(["category", file.as_str()])?;
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair("page_size", &request.page_size.to_string())
            .append_pair("sort_by", request.sort.api_key());
        Ok(url)
    }

    fn lookup_url(&self, id: &ProductId) -> Result<Url> {
        let file = format!("{}.json", id.as_str());
        self.endpoint(["api", "v0", "product", file.as_str()])
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        url: &Url,
        operation: &'static str,
    ) -> Result<T> {
        let mut run_attempt = || self.attempt(ctx, url, operation);
        retry_async_with_observer(ctx, self.retry, operation, &mut run_attempt, |attempt, error| {
            tracing::warn!(
                operation,
                attempt,
                code = %error.code,
                "catalog request failed, retrying"
            );
        })
        .await
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        url: &Url,
        operation: &'static str,
    ) -> Result<T> {
        timeout_with_context(ctx, self.request_timeout, operation, async {
            tracing::debug!(operation, url = %url, "catalog request");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|error| map_reqwest_error(&error))?;

            let status = response.status();
            let payload = response
                .bytes()
                .await
                .map_err(|error| map_reqwest_error(&error))?;

            if !status.is_success() {
                return Err(map_http_error(status, operation));
            }

            serde_json::from_slice(&payload).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("catalog", "invalid_response"),
                    format!("failed to decode catalog response: {error}"),
                    ErrorClass::NonRetriable,
                )
                .with_metadata("operation", operation)
            })
        })
        .await
    }

    async fn fetch_listing(
        &self,
        ctx: &RequestContext,
        url: Url,
        operation: &'static str,
    ) -> Result<CatalogPage> {
        let payload: ListingPayload = self.fetch_json(ctx, &url, operation).await?;
        let total = payload.total();
        let (products, skipped) = payload.into_products();
        if skipped > 0 {
            tracing::debug!(operation, skipped, "skipped malformed catalog entries");
        }
        Ok(CatalogPage { products, total })
    }
}

impl CatalogPort for OpenFoodFactsCatalog {
    fn lookup_by_id(
        &self,
        ctx: &RequestContext,
        id: ProductId,
    ) -> BoxFuture<'_, Result<Option<ProductSummary>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "catalog.lookup_by_id";
            let url = self.lookup_url(&id)?;
            let payload: LookupPayload = match self.fetch_json(&ctx, &url, operation).await {
                Ok(payload) => payload,
                Err(error) if error.is_not_found() => return Ok(None),
                Err(error) => return Err(error),
            };
            payload.into_product(&id).map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("catalog", "invalid_response"),
                    format!("failed to decode product: {error}"),
                    ErrorClass::NonRetriable,
                )
                .with_metadata("operation", operation)
            })
        })
    }

    fn search(
        &self,
        ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<CatalogPage>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let url = self.search_url(&request)?;
            self.fetch_listing(&ctx, url, "catalog.search").await
        })
    }

    fn browse_category(
        &self,
        ctx: &RequestContext,
        request: BrowseRequest,
    ) -> BoxFuture<'_, Result<CatalogPage>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let url = self.browse_url(&request)?;
            self.fetch_listing(&ctx, url, "catalog.browse_category").await
        })
    }

    fn list_categories(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Category>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            let operation = "catalog.list_categories";
            let url = self.endpoint(["categories.json"])?;
            match self.fetch_json::<CategoryListPayload>(&ctx, &url, operation).await {
                Ok(payload) => {
                    Ok(payload.into_categories(self.min_category_products, self.max_categories))
                },
                Err(error) if error.is_cancelled() => Err(error),
                Err(error) => {
                    tracing::warn!(
                        event = "catalog.categories.failed",
                        code = %error.code,
                        message = %error.message,
                        "category listing unavailable"
                    );
                    Ok(Vec::new())
                },
            }
        })
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::timeout(),
            "catalog request timed out",
            ErrorClass::Retriable,
        );
    }
    if error.is_connect() || error.is_request() || error.is_body() {
        return network_unavailable_error(format!("catalog connection failed: {error}"));
    }
    ErrorEnvelope::unexpected(
        ErrorCode::new("catalog", "http_error"),
        format!("catalog request failed: {error}"),
        ErrorClass::NonRetriable,
    )
}

fn map_http_error(status: StatusCode, operation: &'static str) -> ErrorEnvelope {
    let message = format!("catalog responded with HTTP {}", status.as_u16());
    let envelope = match status.as_u16() {
        404 => ErrorEnvelope::expected(ErrorCode::not_found(), message),
        408 => ErrorEnvelope::unexpected(ErrorCode::timeout(), message, ErrorClass::Retriable),
        429 => {
            ErrorEnvelope::unexpected(ErrorCode::rate_limited(), message, ErrorClass::Retriable)
        },
        _ if status.is_server_error() => ErrorEnvelope::unexpected(
            ErrorCode::dependency_unavailable(),
            message,
            ErrorClass::Retriable,
        ),
        _ => ErrorEnvelope::unexpected(
            ErrorCode::new("catalog", "http_error"),
            message,
            ErrorClass::NonRetriable,
        ),
    };
    envelope
        .with_metadata("status", status.as_u16().to_string())
        .with_metadata("operation", operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_config::parse_catalog_config_json;
    use foodify_domain::CategoryId;

    fn catalog(base_url: &str) -> Result<OpenFoodFactsCatalog> {
        let config = parse_catalog_config_json(&format!(
            r#"{{ "client": {{ "baseUrl": "{base_url}" }} }}"#
        ))?;
        OpenFoodFactsCatalog::new(&config)
    }

    fn search_request(sort: SortKey) -> SearchRequest {
        SearchRequest {
            terms: Some("dark chocolate".into()),
            page: 3,
            page_size: 24,
            sort,
            category: None,
            veg_only: false,
        }
    }

    #[test]
    fn search_url_carries_paging_and_sort() -> Result<()> {
        let url = catalog("https://world.openfoodfacts.org")?
            .search_url(&search_request(SortKey::Popularity))?;
        assert_eq!(url.path(), "/cgi/search.pl");
        assert_eq!(
            url.query(),
            Some(
                "search_terms=dark+chocolate&search_simple=1&action=process&json=1&page=3\
                 &page_size=24&sort_by=unique_scans_n"
            )
        );
        Ok(())
    }

    #[test]
    fn search_url_numbers_tag_clauses() -> Result<()> {
        let mut request = search_request(SortKey::Grade);
        request.terms = None;
        request.veg_only = true;
        request.category =
            Some(CategoryId::parse("en:breakfast-cereals").map_err(ErrorEnvelope::from)?);

        let url = catalog("https://world.openfoodfacts.org")?.search_url(&request)?;
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("search_terms"), None);
        assert_eq!(get("sort_by"), Some("nutriscore_score"));
        assert_eq!(get("tagtype_0"), Some("categories"));
        assert_eq!(get("tag_0"), Some("en:breakfast-cereals"));
        assert_eq!(get("tagtype_1"), Some("ingredients_analysis"));
        assert_eq!(get("tag_1"), Some("en:vegetarian"));
        assert_eq!(get("tagtype_2"), Some("states"));
        assert_eq!(get("tag_contains_2"), Some("contains"));
        assert_eq!(get("tag_2"), Some("en:nutrition-facts-completed"));
        Ok(())
    }

    #[test]
    fn endpoints_keep_base_path_prefix() -> Result<()> {
        let adapter = catalog("http://localhost:8080/proxy/")?;
        let id = ProductId::parse("3017620422003").map_err(ErrorEnvelope::from)?;
        assert_eq!(
            adapter.lookup_url(&id)?.as_str(),
            "http://localhost:8080/proxy/api/v0/product/3017620422003.json"
        );

        let browse = BrowseRequest {
            category: CategoryId::parse("en:snacks").map_err(ErrorEnvelope::from)?,
            page: 1,
            page_size: 10,
            sort: SortKey::Newest,
        };
        assert_eq!(
            adapter.browse_url(&browse)?.as_str(),
            "http://localhost:8080/proxy/category/en:snacks.json?page=1&page_size=10&sort_by=created_t"
        );
        Ok(())
    }

    #[test]
    fn http_statuses_map_to_codes() {
        let cases = [
            (StatusCode::NOT_FOUND, ErrorCode::not_found(), false),
            (StatusCode::REQUEST_TIMEOUT, ErrorCode::timeout(), true),
            (StatusCode::TOO_MANY_REQUESTS, ErrorCode::rate_limited(), true),
            (StatusCode::BAD_GATEWAY, ErrorCode::dependency_unavailable(), true),
            (StatusCode::FORBIDDEN, ErrorCode::new("catalog", "http_error"), false),
        ];
        for (status, code, retriable) in cases {
            let error = map_http_error(status, "catalog.search");
            assert_eq!(error.code, code);
            assert_eq!(error.class.is_retriable(), retriable);
            assert_eq!(
                error.metadata.get("status").map(String::as_str),
                Some(status.as_str())
            );
        }
    }
}
