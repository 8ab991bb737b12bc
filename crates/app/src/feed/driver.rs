//! Async driver for [`FeedMachine`].
//!
//! Trigger functions are synchronous: they update the machine under a lock,
//! publish a snapshot, and spawn the fetch the machine asked for. Starting a
//! fetch always cancels and aborts the previous one, so at most one request
//! is alive and only its outcome can reach the machine.

use super::machine::{FeedMachine, FetchPlan, Transition};
use crate::view::FeedSnapshot;
use foodify_domain::{
    Category, CategoryId, PageRequest, ProductSummary, Query, QueryRoute, SortKey,
    network_unavailable_error,
};
use foodify_ports::{
    BrowseRequest, CatalogPort, ConnectivityPort, LogFields, LogLevel, LoggerPort,
    SearchRequest, log_fields,
};
use foodify_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Dependencies required by the product feed.
#[derive(Clone)]
pub struct FeedDeps {
    /// Remote catalog.
    pub catalog: Arc<dyn CatalogPort>,
    /// Network reachability.
    pub connectivity: Arc<dyn ConnectivityPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Feed tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    /// Requested page size.
    pub page_size: u32,
    /// Delay after free-text changes.
    pub search_debounce: Duration,
    /// Delay after category, sort and vegetarian changes.
    pub filter_debounce: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 24,
            search_debounce: Duration::from_millis(600),
            filter_debounce: Duration::ZERO,
        }
    }
}

/// Owned feed state container with trigger functions and a snapshot channel.
///
/// Dropping the feed cancels whatever fetch is still running.
pub struct ProductFeed {
    inner: Arc<Inner>,
}

struct Inner {
    deps: FeedDeps,
    settings: FeedSettings,
    runtime: Handle,
    state: Mutex<FeedState>,
    snapshots: watch::Sender<FeedSnapshot>,
}

struct FeedState {
    machine: FeedMachine,
    active: Option<ActiveFetch>,
}

struct ActiveFetch {
    token: u64,
    ctx: RequestContext,
    task: JoinHandle<()>,
}

enum Fetched {
    Page(Vec<ProductSummary>),
    Lookup(Option<ProductSummary>),
}

impl ProductFeed {
    /// Create an idle feed bound to the current tokio runtime.
    pub fn new(deps: FeedDeps, settings: FeedSettings) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|error| {
            ErrorEnvelope::invariant(
                ErrorCode::internal(),
                format!("product feed requires a tokio runtime: {error}"),
            )
        })?;
        let machine = FeedMachine::new(settings.page_size);
        let (snapshots, _) = watch::channel(machine.snapshot());
        Ok(Self {
            inner: Arc::new(Inner {
                deps,
                settings,
                runtime,
                state: Mutex::new(FeedState {
                    machine,
                    active: None,
                }),
                snapshots,
            }),
        })
    }

    /// Latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Load page 1 of the default query and the category list.
    pub async fn start(&self) -> Result<Vec<Category>> {
        self.force_search();
        self.load_categories().await
    }

    /// Change the free-text term (debounced).
    pub fn set_search_query(&self, text: impl Into<Box<str>>) {
        let text = text.into();
        let delay = self.inner.settings.search_debounce;
        self.inner.change_query(delay, |query| query.with_text(text));
    }

    /// Change the category; `None` means all categories.
    pub fn set_selected_category(&self, category: Option<CategoryId>) {
        let delay = self.inner.settings.filter_debounce;
        self.inner
            .change_query(delay, |query| query.with_category(category));
    }

    /// Change the sort key.
    pub fn set_sort_by(&self, sort: SortKey) {
        let delay = self.inner.settings.filter_debounce;
        self.inner.change_query(delay, |query| query.with_sort(sort));
    }

    /// Toggle the vegetarian-only filter.
    pub fn set_veg_only(&self, veg_only: bool) {
        let delay = self.inner.settings.filter_debounce;
        self.inner
            .change_query(delay, |query| query.with_veg_only(veg_only));
    }

    /// Request the next page. Returns false when the request was rejected.
    pub fn load_more(&self) -> bool {
        let online = self.inner.deps.connectivity.is_online();
        let mut state = self.inner.lock();
        match state.machine.begin_load_more(online) {
            Ok(plan) => {
                Inner::launch(&self.inner, &mut state, plan);
                self.inner.publish(&state);
                true
            },
            Err(rejection) => {
                self.inner.debug(
                    "feed.load_more.rejected",
                    "Load more rejected",
                    log_fields([
                        ("reason", json!(rejection.as_str())),
                        ("page", json!(state.machine.pages_loaded())),
                    ]),
                );
                false
            },
        }
    }

    /// Refetch page 1 of the current query immediately.
    pub fn force_search(&self) {
        let mut state = self.inner.lock();
        let plan = state.machine.force();
        Inner::launch(&self.inner, &mut state, plan);
        self.inner.publish(&state);
    }

    /// Fetch the category list and store it in the snapshot.
    ///
    /// A selected category that turns out to be meat-related while the
    /// vegetarian filter is on is cleared and page 1 refetched.
    pub async fn load_categories(&self) -> Result<Vec<Category>> {
        let ctx = RequestContext::new_request();
        let categories = self.inner.deps.catalog.list_categories(&ctx).await?;

        let mut state = self.inner.lock();
        let delay = self.inner.settings.filter_debounce;
        if let Some(transition) = state.machine.set_categories(categories.clone(), delay) {
            self.inner.apply_transition(&mut state, transition);
        }
        self.inner.publish(&state);
        Ok(categories)
    }

    /// Wait until nothing is scheduled or in flight and return that snapshot.
    pub async fn settled(&self) -> Result<FeedSnapshot> {
        let mut receiver = self.inner.snapshots.subscribe();
        let snapshot = receiver
            .wait_for(|snapshot| !snapshot.phase.is_busy())
            .await
            .map_err(|_| {
                ErrorEnvelope::invariant(ErrorCode::internal(), "feed snapshot channel closed")
            })?;
        Ok(snapshot.clone())
    }
}

impl Drop for ProductFeed {
    fn drop(&mut self) {
        let active = self.inner.lock().active.take();
        if let Some(active) = active {
            active.ctx.cancel();
            active.task.abort();
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &FeedState) {
        self.snapshots.send_replace(state.machine.snapshot());
    }

    fn change_query(
        self: &Arc<Self>,
        delay: Duration,
        change: impl FnOnce(&Query) -> Query,
    ) {
        let mut state = self.lock();
        let next = change(state.machine.query());
        if let Some(transition) = state.machine.replace_query(next, delay) {
            self.apply_transition(&mut state, transition);
            self.publish(&state);
        }
    }

    fn apply_transition(self: &Arc<Self>, state: &mut FeedState, transition: Transition) {
        if let Some(category) = transition.cleared_category {
            self.info(
                "feed.category.reset",
                "Meat category cleared by the vegetarian filter",
                log_fields([("category", json!(category.as_str()))]),
            );
        }
        Self::launch(self, state, transition.plan);
    }

    fn launch(inner: &Arc<Self>, state: &mut FeedState, plan: FetchPlan) {
        if let Some(previous) = state.active.take() {
            previous.ctx.cancel();
            previous.task.abort();
            inner.debug(
                "feed.fetch.superseded",
                "Previous fetch superseded",
                log_fields([
                    ("token", json!(previous.token)),
                    ("supersededBy", json!(plan.token)),
                ]),
            );
        }

        let ctx = RequestContext::new_fetch();
        let token = plan.token;
        let task = inner
            .runtime
            .spawn(run_fetch(Arc::clone(inner), ctx.clone(), plan));
        state.active = Some(ActiveFetch { token, ctx, task });
    }

    fn debug(&self, event: &str, message: &str, fields: LogFields) {
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.debug(event, message, Some(fields));
        }
    }

    fn info(&self, event: &str, message: &str, fields: LogFields) {
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.info(event, message, Some(fields));
        }
    }
}

async fn run_fetch(inner: Arc<Inner>, ctx: RequestContext, plan: FetchPlan) {
    if !plan.delay.is_zero() {
        tokio::select! {
            biased;
            () = ctx.cancelled() => return,
            () = tokio::time::sleep(plan.delay) => {},
        }
        let mut state = inner.lock();
        if !state.machine.debounce_elapsed(plan.token) {
            return;
        }
        inner.publish(&state);
    }

    let fields = plan_fields(&plan, &ctx);
    inner.debug("feed.fetch.start", "Fetch started", fields.clone());
    let started_at = Instant::now();
    let outcome = fetch(&inner, &ctx, &plan.request).await;
    let duration_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut state = inner.lock();
    match outcome {
        Ok(Fetched::Page(products)) => {
            if let Some(merged) = state.machine.apply_page(plan.token, &products) {
                let mut fields = fields;
                fields.extend(log_fields([
                    ("received", json!(merged.received)),
                    ("added", json!(merged.added)),
                    ("total", json!(merged.total)),
                    ("hasMore", json!(merged.has_more)),
                    ("durationMs", json!(duration_ms)),
                ]));
                inner.info("feed.fetch.completed", "Fetch completed", fields);
            }
        },
        Ok(Fetched::Lookup(found)) => {
            if let Some(total) = state.machine.apply_lookup(plan.token, found) {
                let mut fields = fields;
                fields.extend(log_fields([
                    ("total", json!(total)),
                    ("durationMs", json!(duration_ms)),
                ]));
                inner.info("feed.fetch.completed", "Lookup completed", fields);
            }
        },
        Err(error) => {
            if let Some(failure) = state.machine.apply_failure(plan.token, &error) {
                let mut fields = fields;
                fields.extend(log_fields([
                    ("kind", json!(failure.kind.as_str())),
                    ("kept", json!(failure.kept)),
                    ("durationMs", json!(duration_ms)),
                ]));
                if let Some(logger) = inner.deps.logger.as_ref() {
                    logger.failure(
                        LogLevel::Warn,
                        "feed.fetch.failed",
                        "Fetch failed",
                        Some(fields),
                        &error,
                    );
                }
            }
        },
    }

    if state
        .active
        .as_ref()
        .is_some_and(|active| active.token == plan.token)
    {
        state.active = None;
    }
    inner.publish(&state);
}

async fn fetch(inner: &Inner, ctx: &RequestContext, request: &PageRequest) -> Result<Fetched> {
    if !inner.deps.connectivity.is_online() {
        return Err(network_unavailable_error("network is unreachable"));
    }
    let catalog = &inner.deps.catalog;
    match request.query.route() {
        QueryRoute::Lookup(id) => catalog.lookup_by_id(ctx, id).await.map(Fetched::Lookup),
        QueryRoute::Browse(category) => {
            let browse = BrowseRequest {
                category,
                page: request.page,
                page_size: request.page_size,
                sort: request.query.sort,
            };
            let page = catalog.browse_category(ctx, browse).await?;
            Ok(Fetched::Page(page.products))
        },
        QueryRoute::Search => {
            let page = catalog
                .search(ctx, SearchRequest::for_page(request))
                .await?;
            Ok(Fetched::Page(page.products))
        },
    }
}

fn plan_fields(plan: &FetchPlan, ctx: &RequestContext) -> LogFields {
    let query = &plan.request.query;
    log_fields([
        ("token", json!(plan.token)),
        ("fetchId", json!(ctx.correlation_id().as_str())),
        ("page", json!(plan.request.page)),
        ("mode", json!(plan.mode.as_str())),
        ("text", json!(query.text.as_ref())),
        ("category", json!(query.category.as_ref().map(CategoryId::as_str))),
        ("sort", json!(query.sort.as_str())),
        ("vegOnly", json!(query.veg_only)),
    ])
}
