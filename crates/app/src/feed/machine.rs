//! Query/pagination state machine.
//!
//! Pure and synchronous: the async driver feeds it triggers and fetch outcomes,
//! and runs whatever [`FetchPlan`] it hands back. Every plan carries a request
//! token; outcomes reported under any other token than the authoritative one
//! are dropped without touching state.

use crate::post_process::{clean_page, sort_by_grade};
use crate::view::FeedSnapshot;
use foodify_domain::{
    Category, CategoryId, FeedPhase, FetchErrorKind, PageRequest, ProductId, ProductSummary,
    Query, SortKey, is_meat_related,
};
use foodify_shared::ErrorEnvelope;
use rustc_hash::FxHashSet;
use std::time::Duration;

/// Whether a fetch replaces the result list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Page 1 of a new query.
    Replace,
    /// Next page of the current query.
    Append,
}

impl FetchMode {
    /// Stable name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
        }
    }
}

/// A fetch the driver must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    /// Token the outcome must be reported under.
    pub token: u64,
    /// Page to request.
    pub request: PageRequest,
    /// Merge policy for the outcome.
    pub mode: FetchMode,
    /// Debounce wait before the request starts.
    pub delay: Duration,
}

/// Outcome of a query change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Page-1 fetch for the new query.
    pub plan: FetchPlan,
    /// Category dropped because it conflicts with the vegetarian filter.
    pub cleared_category: Option<CategoryId>,
}

/// Why `load_more` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreRejection {
    /// A fetch is already scheduled or running.
    Busy,
    /// The last page was short.
    Exhausted,
    /// An error is showing.
    Errored,
    /// The network is unreachable.
    Offline,
}

impl LoadMoreRejection {
    /// Stable name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::Exhausted => "exhausted",
            Self::Errored => "errored",
            Self::Offline => "offline",
        }
    }
}

/// User-visible fetch error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    /// Classified kind.
    pub kind: FetchErrorKind,
    /// Kind-specific message.
    pub message: Box<str>,
}

/// Summary of a merged page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Page number that was merged.
    pub page: u32,
    /// Raw item count returned upstream.
    pub received: usize,
    /// Items added after cleaning and dedup.
    pub added: usize,
    /// Result list length after the merge.
    pub total: usize,
    /// Whether another page may exist.
    pub has_more: bool,
}

/// Summary of an applied failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureSummary {
    /// Page whose fetch failed.
    pub page: u32,
    /// Classified kind.
    pub kind: FetchErrorKind,
    /// Result list length kept after the failure.
    pub kept: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    token: u64,
    mode: FetchMode,
    page: u32,
}

/// Owns the query, result list, pagination cursor and the authoritative token.
#[derive(Debug)]
pub struct FeedMachine {
    query: Query,
    page_size: u32,
    products: Vec<ProductSummary>,
    seen: FxHashSet<ProductId>,
    next_page: u32,
    has_more: bool,
    error: Option<FeedError>,
    phase: FeedPhase,
    in_flight: Option<InFlight>,
    last_token: u64,
    categories: Vec<Category>,
}

impl FeedMachine {
    /// Create an idle machine for the default query. A zero page size is raised to 1.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            query: Query::default(),
            page_size: page_size.max(1),
            products: Vec::new(),
            seen: FxHashSet::default(),
            next_page: 1,
            has_more: true,
            error: None,
            phase: FeedPhase::Idle,
            in_flight: None,
            last_token: 0,
            categories: Vec::new(),
        }
    }

    /// Active query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> FeedPhase {
        self.phase
    }

    /// Result list.
    #[must_use]
    pub fn products(&self) -> &[ProductSummary] {
        &self.products
    }

    /// Whether another page may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Visible error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    /// Number of pages merged for the current query.
    #[must_use]
    pub const fn pages_loaded(&self) -> u32 {
        self.next_page.saturating_sub(1)
    }

    /// Known categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Merge policy of the scheduled or running fetch.
    #[must_use]
    pub fn in_flight_mode(&self) -> Option<FetchMode> {
        self.in_flight.map(|flight| flight.mode)
    }

    /// Returns true when `token` is the authoritative one.
    #[must_use]
    pub fn is_authoritative(&self, token: u64) -> bool {
        self.in_flight.is_some_and(|flight| flight.token == token)
    }

    /// Replace the query. Unchanged queries are a no-op.
    ///
    /// A category that conflicts with the vegetarian filter is cleared first.
    pub fn replace_query(&mut self, query: Query, delay: Duration) -> Option<Transition> {
        let (query, cleared_category) = self.without_meat_conflict(query);
        if query == self.query {
            return None;
        }
        self.query = query;
        Some(Transition {
            plan: self.restart(delay),
            cleared_category,
        })
    }

    /// Restart page 1 of the current query with no debounce.
    pub fn force(&mut self) -> FetchPlan {
        self.restart(Duration::ZERO)
    }

    /// Start the next page when the feed is idle, error-free, not exhausted and online.
    pub fn begin_load_more(&mut self, online: bool) -> Result<FetchPlan, LoadMoreRejection> {
        if self.phase.is_busy() {
            return Err(LoadMoreRejection::Busy);
        }
        if self.error.is_some() {
            return Err(LoadMoreRejection::Errored);
        }
        if !self.has_more {
            return Err(LoadMoreRejection::Exhausted);
        }
        if !online {
            return Err(LoadMoreRejection::Offline);
        }
        Ok(self.schedule(self.next_page, FetchMode::Append, Duration::ZERO))
    }

    /// Move a debounced fetch to `Fetching`. Returns false when `token` was superseded.
    pub fn debounce_elapsed(&mut self, token: u64) -> bool {
        if self.phase == (FeedPhase::DebouncePending { token }) {
            self.phase = FeedPhase::Fetching { token };
            true
        } else {
            false
        }
    }

    /// Merge a listing page. Stale tokens return `None`.
    pub fn apply_page(&mut self, token: u64, raw: &[ProductSummary]) -> Option<MergeSummary> {
        let flight = self.take_flight(token)?;
        if flight.mode == FetchMode::Replace {
            self.clear_results();
        }

        let cleaned = clean_page(raw, self.query.sort, self.query.veg_only);
        let before = self.products.len();
        for product in cleaned {
            if self.seen.insert(product.id.clone()) {
                self.products.push(product);
            }
        }
        if self.query.sort == SortKey::Grade {
            sort_by_grade(&mut self.products);
        }

        self.has_more = raw.len() >= self.page_size as usize;
        self.next_page = flight.page.saturating_add(1);
        self.phase = FeedPhase::Idle;
        Some(MergeSummary {
            page: flight.page,
            received: raw.len(),
            added: self.products.len() - before,
            total: self.products.len(),
            has_more: self.has_more,
        })
    }

    /// Apply an identifier lookup. A miss yields an empty list without an error.
    pub fn apply_lookup(&mut self, token: u64, found: Option<ProductSummary>) -> Option<usize> {
        let flight = self.take_flight(token)?;
        self.clear_results();
        if let Some(product) = found {
            self.seen.insert(product.id.clone());
            self.products.push(product);
        }
        self.has_more = false;
        self.next_page = flight.page.saturating_add(1);
        self.phase = FeedPhase::Idle;
        Some(self.products.len())
    }

    /// Apply a failed fetch. Stale tokens and cancellations return `None`.
    ///
    /// Page-1 failures clear the list. Continuation failures keep it. Both stop
    /// pagination and surface the classified message.
    pub fn apply_failure(&mut self, token: u64, error: &ErrorEnvelope) -> Option<FailureSummary> {
        let flight = self.take_flight(token)?;
        let kind = FetchErrorKind::classify(error);
        if !kind.is_user_visible() {
            self.phase = if self.error.is_some() {
                FeedPhase::Error
            } else {
                FeedPhase::Idle
            };
            return None;
        }

        if flight.mode == FetchMode::Replace {
            self.clear_results();
        }
        self.has_more = false;
        self.error = Some(FeedError {
            kind,
            message: kind.user_message().into(),
        });
        self.phase = FeedPhase::Error;
        Some(FailureSummary {
            page: flight.page,
            kind,
            kept: self.products.len(),
        })
    }

    /// Store the category list. Restarts page 1 when the selection turns out to
    /// conflict with the vegetarian filter.
    pub fn set_categories(&mut self, categories: Vec<Category>, delay: Duration) -> Option<Transition> {
        self.categories = categories;
        let (query, cleared_category) = self.without_meat_conflict(self.query.clone());
        if cleared_category.is_none() {
            return None;
        }
        self.query = query;
        Some(Transition {
            plan: self.restart(delay),
            cleared_category,
        })
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot::from_machine(self)
    }

    fn without_meat_conflict(&self, query: Query) -> (Query, Option<CategoryId>) {
        if !query.veg_only {
            return (query, None);
        }
        match query.category.as_ref() {
            Some(category) if self.is_meat_category(category) => {
                let cleared = category.clone();
                (query.with_category(None), Some(cleared))
            },
            _ => (query, None),
        }
    }

    fn is_meat_category(&self, id: &CategoryId) -> bool {
        self.categories
            .iter()
            .find(|category| &category.id == id)
            .map_or_else(|| is_meat_related(id.as_str()), Category::is_meat_related)
    }

    fn restart(&mut self, delay: Duration) -> FetchPlan {
        self.clear_results();
        self.next_page = 1;
        self.has_more = true;
        self.error = None;
        self.schedule(1, FetchMode::Replace, delay)
    }

    fn schedule(&mut self, page: u32, mode: FetchMode, delay: Duration) -> FetchPlan {
        self.last_token += 1;
        let token = self.last_token;
        self.in_flight = Some(InFlight { token, mode, page });
        self.phase = if delay.is_zero() {
            FeedPhase::Fetching { token }
        } else {
            FeedPhase::DebouncePending { token }
        };
        FetchPlan {
            token,
            request: PageRequest {
                query: self.query.clone(),
                page,
                page_size: self.page_size,
            },
            mode,
            delay,
        }
    }

    fn take_flight(&mut self, token: u64) -> Option<InFlight> {
        if self.is_authoritative(token) {
            self.in_flight.take()
        } else {
            None
        }
    }

    fn clear_results(&mut self) {
        self.products.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodify_domain::{NutritionGrade, PrimitiveError};
    use foodify_shared::{ErrorClass, ErrorCode};
    use proptest::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const DEBOUNCE: Duration = Duration::from_millis(600);

    fn product(id: &str, grade: Option<NutritionGrade>) -> Result<ProductSummary, PrimitiveError> {
        let mut product = ProductSummary::new(ProductId::parse(id)?);
        product.name = Some(format!("product {id}").into());
        product.grade = grade;
        Ok(product)
    }

    fn page(range: std::ops::Range<u32>) -> Result<Vec<ProductSummary>, PrimitiveError> {
        range.map(|n| product(&n.to_string(), None)).collect()
    }

    fn timeout() -> ErrorEnvelope {
        ErrorEnvelope::unexpected(ErrorCode::timeout(), "timed out", ErrorClass::Retriable)
    }

    fn loaded(page_size: u32, first: &[ProductSummary]) -> Result<FeedMachine, &'static str> {
        let mut machine = FeedMachine::new(page_size);
        let plan = machine.force();
        machine
            .apply_page(plan.token, first)
            .ok_or("first page was not applied")?;
        Ok(machine)
    }

    fn trigger(
        machine: &mut FeedMachine,
        query: Query,
        delay: Duration,
    ) -> Result<Transition, &'static str> {
        machine
            .replace_query(query, delay)
            .ok_or("query change did not schedule a fetch")
    }

    #[test]
    fn text_trigger_debounces_and_resets() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        let query = machine.query().with_text("oats");
        let transition = trigger(&mut machine, query, DEBOUNCE)?;

        assert_eq!(transition.plan.delay, DEBOUNCE);
        assert_eq!(transition.plan.request.page, 1);
        assert!(machine.products().is_empty());
        assert!(machine.has_more());
        assert_eq!(
            machine.phase(),
            FeedPhase::DebouncePending {
                token: transition.plan.token
            }
        );
        assert!(machine.debounce_elapsed(transition.plan.token));
        assert_eq!(
            machine.phase(),
            FeedPhase::Fetching {
                token: transition.plan.token
            }
        );
        Ok(())
    }

    #[test]
    fn unchanged_query_is_a_no_op() {
        let mut machine = FeedMachine::new(24);
        assert!(machine.replace_query(Query::default(), Duration::ZERO).is_none());
    }

    #[test]
    fn superseded_tokens_are_ignored() -> TestResult {
        let mut machine = FeedMachine::new(2);
        let query = machine.query().with_text("a");
        let first = trigger(&mut machine, query, DEBOUNCE)?;
        let query = machine.query().with_text("ab");
        let second = trigger(&mut machine, query, DEBOUNCE)?;

        assert!(!machine.debounce_elapsed(first.plan.token));
        assert!(machine.apply_page(first.plan.token, &page(0..2)?).is_none());
        assert!(machine.apply_failure(first.plan.token, &timeout()).is_none());
        assert!(machine.products().is_empty());

        assert!(machine.debounce_elapsed(second.plan.token));
        let merged = machine
            .apply_page(second.plan.token, &page(5..7)?)
            .ok_or("latest page was dropped")?;
        assert_eq!(merged.total, 2);
        assert_eq!(machine.phase(), FeedPhase::Idle);
        Ok(())
    }

    #[test]
    fn load_more_appends_and_dedups() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        let plan = machine
            .begin_load_more(true)
            .map_err(LoadMoreRejection::as_str)?;
        assert_eq!(plan.request.page, 2);
        assert_eq!(plan.mode, FetchMode::Append);
        assert_eq!(machine.begin_load_more(true), Err(LoadMoreRejection::Busy));

        let merged = machine
            .apply_page(plan.token, &page(2..5)?)
            .ok_or("page 2 was dropped")?;
        assert_eq!(merged.added, 2);
        assert_eq!(merged.total, 5);
        assert!(merged.has_more);
        assert_eq!(machine.pages_loaded(), 2);
        Ok(())
    }

    #[test]
    fn short_or_empty_page_exhausts() -> TestResult {
        let mut machine = loaded(3, &page(0..2)?)?;
        assert!(!machine.has_more());
        assert_eq!(
            machine.begin_load_more(true),
            Err(LoadMoreRejection::Exhausted)
        );

        let machine = loaded(3, &[])?;
        assert!(!machine.has_more());
        Ok(())
    }

    #[test]
    fn offline_blocks_load_more() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        assert_eq!(
            machine.begin_load_more(false),
            Err(LoadMoreRejection::Offline)
        );
        assert!(!machine.phase().is_busy());
        Ok(())
    }

    #[test]
    fn first_page_failure_clears_and_errors() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        let plan = machine.force();
        let failure = machine
            .apply_failure(plan.token, &timeout())
            .ok_or("failure was dropped")?;

        assert_eq!(failure.kind, FetchErrorKind::Timeout);
        assert_eq!(failure.kept, 0);
        assert_eq!(machine.phase(), FeedPhase::Error);
        assert!(!machine.has_more());
        assert_eq!(
            machine.begin_load_more(true),
            Err(LoadMoreRejection::Errored)
        );

        let retry = machine.force();
        assert!(machine.error().is_none());
        assert!(machine.apply_page(retry.token, &page(0..1)?).is_some());
        Ok(())
    }

    #[test]
    fn continuation_failure_keeps_results() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        let plan = machine
            .begin_load_more(true)
            .map_err(LoadMoreRejection::as_str)?;
        let failure = machine
            .apply_failure(plan.token, &timeout())
            .ok_or("failure was dropped")?;

        assert_eq!(failure.page, 2);
        assert_eq!(failure.kept, 3);
        assert_eq!(machine.products().len(), 3);
        assert!(!machine.has_more());
        assert_eq!(
            machine.error().map(|error| error.kind),
            Some(FetchErrorKind::Timeout)
        );
        Ok(())
    }

    #[test]
    fn cancellation_is_invisible() -> TestResult {
        let mut machine = loaded(3, &page(0..3)?)?;
        let plan = machine
            .begin_load_more(true)
            .map_err(LoadMoreRejection::as_str)?;
        let cancelled = ErrorEnvelope::cancelled("superseded");

        assert!(machine.apply_failure(plan.token, &cancelled).is_none());
        assert!(machine.error().is_none());
        assert_eq!(machine.products().len(), 3);
        assert!(machine.has_more());
        assert_eq!(machine.phase(), FeedPhase::Idle);
        Ok(())
    }

    #[test]
    fn lookup_miss_is_empty_without_error() -> TestResult {
        let mut machine = FeedMachine::new(24);
        let query = machine.query().with_text("1234567890123");
        let transition = trigger(&mut machine, query, Duration::ZERO)?;

        assert_eq!(machine.apply_lookup(transition.plan.token, None), Some(0));
        assert!(machine.error().is_none());
        assert!(!machine.has_more());
        Ok(())
    }

    #[test]
    fn lookup_hit_is_shown_even_without_grade_under_grade_sort() -> TestResult {
        let mut machine = FeedMachine::new(24);
        let query = machine
            .query()
            .with_sort(SortKey::Grade)
            .with_text("1234567890123");
        let transition = trigger(&mut machine, query, Duration::ZERO)?;
        let ungraded = product("1234567890123", None)?;

        assert_eq!(
            machine.apply_lookup(transition.plan.token, Some(ungraded)),
            Some(1)
        );
        assert_eq!(machine.products().len(), 1);
        assert!(machine.products().iter().all(|p| p.grade.is_none()));
        assert!(!machine.has_more());
        Ok(())
    }

    #[test]
    fn meat_category_is_cleared_when_categories_arrive() -> TestResult {
        let mut machine = FeedMachine::new(24);
        let cold_cuts = CategoryId::parse("en:cold-cuts")?;
        let query = machine
            .query()
            .with_veg_only(true)
            .with_category(Some(cold_cuts.clone()));
        let transition = trigger(&mut machine, query, Duration::ZERO)?;
        assert!(transition.cleared_category.is_none());

        let categories = vec![Category {
            id: cold_cuts.clone(),
            name: "Cold cuts and hams".into(),
            products: 9_000,
        }];
        let reset = machine
            .set_categories(categories, Duration::ZERO)
            .ok_or("meat category was not reset")?;

        assert_eq!(reset.cleared_category, Some(cold_cuts));
        assert!(machine.query().category.is_none());
        assert!(reset.plan.request.query.veg_only);
        assert!(!machine.is_authoritative(transition.plan.token));
        Ok(())
    }

    #[test]
    fn meat_category_is_cleared_at_trigger_time() -> TestResult {
        let mut machine = FeedMachine::new(24);
        let query = machine
            .query()
            .with_veg_only(true)
            .with_category(Some(CategoryId::parse("en:sausages")?));

        let transition = trigger(&mut machine, query, Duration::ZERO)?;
        assert!(transition.cleared_category.is_some());
        assert!(transition.plan.request.query.category.is_none());
        Ok(())
    }

    #[test]
    fn meat_substitute_categories_stay_selected_under_veg_only() -> TestResult {
        for id in [
            "en:meat-analogues",
            "en:meat-alternatives",
            "en:vegetarian-sausages",
            "en:plant-based-meat-alternatives",
        ] {
            let mut machine = FeedMachine::new(24);
            let category = CategoryId::parse(id)?;
            let query = machine
                .query()
                .with_veg_only(true)
                .with_category(Some(category.clone()));

            let transition = trigger(&mut machine, query, Duration::ZERO)?;
            assert!(transition.cleared_category.is_none(), "{id} was cleared");
            assert_eq!(transition.plan.request.query.category, Some(category));

            let categories = vec![Category {
                id: CategoryId::parse(id)?,
                name: "Meat analogues".into(),
                products: 6_000,
            }];
            assert!(machine.set_categories(categories, Duration::ZERO).is_none());
            assert!(machine.query().category.is_some());
        }
        Ok(())
    }

    fn arb_page() -> impl Strategy<Value = Vec<ProductSummary>> {
        let grade = prop_oneof![
            Just(None),
            proptest::sample::select(NutritionGrade::ALL.to_vec()).prop_map(Some),
        ];
        proptest::collection::vec((0u32..30, grade), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .filter_map(|(id, grade)| product(&id.to_string(), grade).ok())
                .collect()
        })
    }

    proptest! {
        #[test]
        fn merges_keep_unique_ids_and_grade_order(
            pages in proptest::collection::vec(arb_page(), 1..6),
        ) {
            let mut machine = FeedMachine::new(4);
            let query = machine.query().with_sort(SortKey::Grade);
            let Some(transition) = machine.replace_query(query, Duration::ZERO) else {
                return Err(TestCaseError::fail("grade sort did not schedule a fetch"));
            };
            let mut token = transition.plan.token;

            for (index, raw) in pages.iter().enumerate() {
                if index > 0 {
                    match machine.begin_load_more(true) {
                        Ok(plan) => token = plan.token,
                        Err(_) => break,
                    }
                }
                machine.apply_page(token, raw);

                let products = machine.products();
                let unique: FxHashSet<&ProductId> = products.iter().map(|p| &p.id).collect();
                prop_assert_eq!(unique.len(), products.len());
                prop_assert!(products.iter().all(|p| p.grade.is_some()));
                prop_assert!(products.windows(2).all(|pair| pair[0].grade <= pair[1].grade));
                prop_assert_eq!(machine.has_more(), raw.len() >= 4);
            }
        }
    }
}
