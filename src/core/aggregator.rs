//! # Paged Result Aggregator
//!
//! Fetches successive pages for one browse context (popular, a genre, or a
//! search query) and merges them into a single ordered list.
//!
//! The aggregator does no I/O itself. It hands out a `PageTicket` for the
//! page it wants, the caller runs the fetch (see [`fetch_page`]) and feeds the
//! result back through [`PagedAggregator::complete`]. Each ticket carries the
//! generation it was issued under, so a response for a context the user has
//! already left is recognised as stale and dropped.
//!
//! ```text
//!            set_context                 complete(Ok, items)
//!  Idle ─────────────────► Fetching(1) ───────────────────► Loaded(1)
//!                              │                              │ fetch_next
//!                              │ complete(Err)                ▼
//!                              ▼                         Fetching(n+1)
//!                          Failed(0)                      │         │
//!                                            complete(Err)│         │complete(Ok, [])
//!                                                         ▼         ▼
//!                                                   Failed(n)   Exhausted(n+1)
//! ```
//!
//! Invariants:
//! - at most one page request is in flight per context;
//! - pages are applied strictly in page order;
//! - a failure never touches accumulated results or the cursor.

use std::fmt;

use log::{debug, info, warn};

use crate::catalog::{CatalogError, CatalogProvider, Movie, ResultPage};
use crate::core::observer::{SubscriptionId, Subscribers};

/// The active browse mode and its parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BrowseContext {
    #[default]
    Popular,
    Genre(u64),
    Search(String),
}

impl BrowseContext {
    pub fn kind(&self) -> &'static str {
        match self {
            BrowseContext::Popular => "popular",
            BrowseContext::Genre(_) => "genre",
            BrowseContext::Search(_) => "search",
        }
    }
}

impl fmt::Display for BrowseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowseContext::Popular => write!(f, "popular"),
            BrowseContext::Genre(id) => write!(f, "genre {id}"),
            BrowseContext::Search(query) => write!(f, "search \"{query}\""),
        }
    }
}

/// A request for one page, tagged with the context generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    pub context: BrowseContext,
    pub page: u32,
}

impl PageTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A page fetch that failed. Always recoverable by fetching again.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailed {
    pub context: BrowseContext,
    pub page: u32,
    pub reason: String,
}

impl fmt::Display for FetchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to load page {} of {}: {}",
            self.page, self.context, self.reason
        )
    }
}

impl std::error::Error for FetchFailed {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Idle,
    Fetching { page: u32 },
    Loaded { cursor: u32 },
    Exhausted { cursor: u32 },
    Failed { cursor: u32 },
}

/// What applying a page response did.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Items were appended and more pages may follow.
    Appended { added: usize },
    /// The page ended the listing (possibly with a final batch of items).
    Exhausted { added: usize },
    /// The response belonged to an old context or an unexpected page. Ignored.
    Stale,
    Failed(FetchFailed),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregatorEvent {
    /// The context changed and results were cleared.
    Reset(BrowseContext),
    PageAppended { page: u32, added: usize, total: usize },
    Exhausted { cursor: u32 },
    FetchFailed(FetchFailed),
}

pub struct PagedAggregator {
    context: BrowseContext,
    generation: u64,
    results: Vec<Movie>,
    cursor: u32,
    exhausted: bool,
    in_flight: Option<u32>,
    last_error: Option<FetchFailed>,
    subscribers: Subscribers<AggregatorEvent>,
}

impl PagedAggregator {
    /// An idle aggregator for `context`. Nothing is fetched until `fetch_next`.
    pub fn new(context: BrowseContext) -> Self {
        Self {
            context,
            generation: 0,
            results: Vec::new(),
            cursor: 0,
            exhausted: false,
            in_flight: None,
            last_error: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Switches to `context`, clears accumulated results and issues page 1.
    ///
    /// Any request still in flight for the previous context becomes stale.
    pub fn set_context(&mut self, context: BrowseContext) -> PageTicket {
        info!("Browse context: {} -> {}", self.context, context);
        self.generation += 1;
        self.context = context;
        self.results.clear();
        self.cursor = 0;
        self.exhausted = false;
        self.in_flight = None;
        self.last_error = None;
        self.subscribers
            .notify(&AggregatorEvent::Reset(self.context.clone()));

        // Nothing is in flight and nothing is exhausted right after a reset.
        self.issue()
    }

    /// Issues a ticket for the page after the cursor.
    ///
    /// Returns `None` when the listing is exhausted or a request is already
    /// outstanding.
    pub fn fetch_next(&mut self) -> Option<PageTicket> {
        if self.exhausted {
            debug!("fetch_next ignored: {} is exhausted", self.context);
            return None;
        }
        if let Some(page) = self.in_flight {
            debug!("fetch_next ignored: page {} of {} in flight", page, self.context);
            return None;
        }
        Some(self.issue())
    }

    fn issue(&mut self) -> PageTicket {
        let page = self.cursor + 1;
        self.in_flight = Some(page);
        self.last_error = None;
        debug!("Issuing page {} of {} (generation {})", page, self.context, self.generation);
        PageTicket {
            generation: self.generation,
            context: self.context.clone(),
            page,
        }
    }

    /// Applies the outcome of the fetch issued for `ticket`.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<ResultPage, CatalogError>,
    ) -> Completion {
        if ticket.generation != self.generation || self.in_flight != Some(ticket.page) {
            debug!(
                "Dropping stale page {} of {} (generation {}, current {})",
                ticket.page, ticket.context, ticket.generation, self.generation
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let added = page.results.len();
                let last = page.is_last();
                self.results.extend(page.results);
                self.cursor = ticket.page;
                info!(
                    "Page {} of {}: {} items ({} total)",
                    ticket.page,
                    self.context,
                    added,
                    self.results.len()
                );
                if added > 0 {
                    self.subscribers.notify(&AggregatorEvent::PageAppended {
                        page: ticket.page,
                        added,
                        total: self.results.len(),
                    });
                }
                if last {
                    self.exhausted = true;
                    self.subscribers
                        .notify(&AggregatorEvent::Exhausted { cursor: self.cursor });
                    Completion::Exhausted { added }
                } else {
                    Completion::Appended { added }
                }
            }
            Err(e) => {
                warn!("Page {} of {} failed: {}", ticket.page, self.context, e);
                let failure = FetchFailed {
                    context: ticket.context,
                    page: ticket.page,
                    reason: e.to_string(),
                };
                self.last_error = Some(failure.clone());
                self.subscribers
                    .notify(&AggregatorEvent::FetchFailed(failure.clone()));
                Completion::Failed(failure)
            }
        }
    }

    /// Fetches and applies the next page in one step.
    ///
    /// Returns `None` if `fetch_next` would not issue a request.
    pub async fn load_next(&mut self, catalog: &dyn CatalogProvider) -> Option<Completion> {
        let ticket = self.fetch_next()?;
        let result = fetch_page(catalog, &ticket).await;
        Some(self.complete(ticket, result))
    }

    pub fn current_results(&self) -> &[Movie] {
        &self.results
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last successfully fetched page number (0 before the first page).
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn context(&self) -> &BrowseContext {
        &self.context
    }

    pub fn last_error(&self) -> Option<&FetchFailed> {
        self.last_error.as_ref()
    }

    pub fn state(&self) -> AggregatorState {
        if let Some(page) = self.in_flight {
            AggregatorState::Fetching { page }
        } else if self.exhausted {
            AggregatorState::Exhausted { cursor: self.cursor }
        } else if self.last_error.is_some() {
            AggregatorState::Failed { cursor: self.cursor }
        } else if self.cursor == 0 {
            AggregatorState::Idle
        } else {
            AggregatorState::Loaded { cursor: self.cursor }
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&AggregatorEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

/// Runs the catalog request a ticket stands for.
pub async fn fetch_page(
    catalog: &dyn CatalogProvider,
    ticket: &PageTicket,
) -> Result<ResultPage, CatalogError> {
    match &ticket.context {
        BrowseContext::Popular => catalog.popular(ticket.page).await,
        BrowseContext::Genre(id) => catalog.discover_by_genre(*id, ticket.page).await,
        BrowseContext::Search(query) => catalog.search(query, ticket.page).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubCatalog, page_of};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn network_error() -> CatalogError {
        CatalogError::Network("connection reset".to_string())
    }

    fn ids(agg: &PagedAggregator) -> Vec<u64> {
        agg.current_results().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_new_is_idle() {
        let agg = PagedAggregator::new(BrowseContext::Popular);
        assert_eq!(agg.state(), AggregatorState::Idle);
        assert!(agg.has_more());
        assert!(agg.current_results().is_empty());
        assert_eq!(agg.cursor(), 0);
    }

    #[test]
    fn test_three_pages_then_exhausted() {
        let mut agg = PagedAggregator::new(BrowseContext::Genre(5));
        let pages = [page_of(1, &[1, 2]), page_of(2, &[3, 4]), page_of(3, &[])];

        for page in pages {
            let ticket = agg.fetch_next().expect("should issue");
            assert_eq!(ticket.page, page.page);
            agg.complete(ticket, Ok(page));
        }

        assert_eq!(agg.current_results().len(), 4);
        assert_eq!(ids(&agg), vec![1, 2, 3, 4]);
        assert!(!agg.has_more());
        assert_eq!(agg.state(), AggregatorState::Exhausted { cursor: 3 });
        assert!(agg.fetch_next().is_none());
    }

    #[test]
    fn test_no_second_ticket_while_in_flight() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let first = agg.fetch_next().unwrap();
        assert!(agg.fetch_next().is_none());
        assert_eq!(agg.state(), AggregatorState::Fetching { page: 1 });

        agg.complete(first, Ok(page_of(1, &[1])));
        let second = agg.fetch_next().unwrap();
        assert_eq!(second.page, 2);
    }

    #[test]
    fn test_set_context_discards_stale_response() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let search = agg.set_context(BrowseContext::Search("x".into()));
        let genre = agg.set_context(BrowseContext::Genre(5));

        // Genre resolves first, then the stale search response arrives.
        assert_eq!(
            agg.complete(genre, Ok(page_of(1, &[50, 51]))),
            Completion::Appended { added: 2 }
        );
        assert_eq!(
            agg.complete(search, Ok(page_of(1, &[90, 91, 92]))),
            Completion::Stale
        );

        assert_eq!(ids(&agg), vec![50, 51]);
        assert_eq!(agg.context(), &BrowseContext::Genre(5));
        assert_eq!(agg.cursor(), 1);
    }

    #[test]
    fn test_stale_response_arriving_first_is_dropped() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let search = agg.set_context(BrowseContext::Search("x".into()));
        let genre = agg.set_context(BrowseContext::Genre(5));

        assert_eq!(agg.complete(search, Ok(page_of(1, &[90]))), Completion::Stale);
        // Still waiting on the genre page
        assert!(agg.is_fetching());
        agg.complete(genre, Ok(page_of(1, &[50])));
        assert_eq!(ids(&agg), vec![50]);
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let old = agg.set_context(BrowseContext::Popular);
        let current = agg.set_context(BrowseContext::Genre(1));
        agg.complete(current, Ok(page_of(1, &[1])));

        assert_eq!(agg.complete(old, Err(network_error())), Completion::Stale);
        assert!(agg.last_error().is_none());
        assert_eq!(agg.state(), AggregatorState::Loaded { cursor: 1 });
    }

    #[test]
    fn test_duplicate_completion_is_stale() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let ticket = agg.fetch_next().unwrap();
        agg.complete(ticket.clone(), Ok(page_of(1, &[1])));
        assert_eq!(agg.complete(ticket, Ok(page_of(1, &[1]))), Completion::Stale);
        assert_eq!(ids(&agg), vec![1]);
    }

    #[test]
    fn test_failure_leaves_results_and_cursor() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let failures = Rc::new(RefCell::new(0));
        let f = failures.clone();
        agg.subscribe(move |e| {
            if matches!(e, AggregatorEvent::FetchFailed(_)) {
                *f.borrow_mut() += 1;
            }
        });

        let t1 = agg.fetch_next().unwrap();
        agg.complete(t1, Ok(page_of(1, &[1, 2])));
        let t2 = agg.fetch_next().unwrap();
        let completion = agg.complete(t2, Err(network_error()));

        assert!(matches!(completion, Completion::Failed(ref e) if e.page == 2));
        assert_eq!(ids(&agg), vec![1, 2]);
        assert_eq!(agg.cursor(), 1);
        assert!(agg.has_more());
        assert_eq!(agg.state(), AggregatorState::Failed { cursor: 1 });
        assert_eq!(*failures.borrow(), 1);

        // Retry re-issues the same page
        let retry = agg.fetch_next().unwrap();
        assert_eq!(retry.page, 2);
        assert!(agg.last_error().is_none());
    }

    #[test]
    fn test_initial_failure_leaves_empty_list() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let ticket = agg.set_context(BrowseContext::Search("dune".into()));
        agg.complete(ticket, Err(CatalogError::Api { status: 500, message: "boom".into() }));
        assert!(agg.current_results().is_empty());
        assert_eq!(agg.state(), AggregatorState::Failed { cursor: 0 });
        let err = agg.last_error().unwrap();
        assert_eq!(err.page, 1);
        assert!(err.to_string().contains("search \"dune\""));
    }

    #[test]
    fn test_set_context_resets_exhaustion() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let t = agg.fetch_next().unwrap();
        agg.complete(t, Ok(page_of(1, &[])));
        assert!(!agg.has_more());

        let t = agg.set_context(BrowseContext::Genre(2));
        assert!(agg.has_more());
        assert!(agg.current_results().is_empty());
        assert_eq!(t.page, 1);
    }

    #[test]
    fn test_total_pages_hint_ends_listing() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let t = agg.fetch_next().unwrap();
        let mut page = page_of(1, &[1, 2]);
        page.total_pages = Some(1);
        assert_eq!(agg.complete(t, Ok(page)), Completion::Exhausted { added: 2 });
        assert!(!agg.has_more());
    }

    #[test]
    fn test_events_in_order() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        agg.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let t = agg.set_context(BrowseContext::Genre(3));
        agg.complete(t, Ok(page_of(1, &[1])));
        let t = agg.fetch_next().unwrap();
        agg.complete(t, Ok(page_of(2, &[])));

        assert_eq!(
            *events.borrow(),
            vec![
                AggregatorEvent::Reset(BrowseContext::Genre(3)),
                AggregatorEvent::PageAppended { page: 1, added: 1, total: 1 },
                AggregatorEvent::Exhausted { cursor: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_load_next_drives_catalog() {
        let catalog = StubCatalog::new().with_pages(vec![
            page_of(1, &[1, 2]),
            page_of(2, &[3, 4]),
            page_of(3, &[]),
        ]);
        let mut agg = PagedAggregator::new(BrowseContext::Popular);

        for _ in 0..3 {
            assert!(agg.load_next(&catalog).await.is_some());
        }
        assert_eq!(agg.current_results().len(), 4);
        assert!(!agg.has_more());
        assert!(agg.load_next(&catalog).await.is_none());
        assert_eq!(catalog.page_calls(), 3);
    }

    #[tokio::test]
    async fn test_outstanding_fetch_blocks_duplicate_request() {
        let catalog = StubCatalog::new().with_pages(vec![page_of(1, &[1]), page_of(2, &[2])]);
        let mut agg = PagedAggregator::new(BrowseContext::Popular);

        let ticket = agg.fetch_next().unwrap();
        // Scroll fires again while the first request is outstanding
        assert!(agg.fetch_next().is_none());
        assert!(agg.load_next(&catalog).await.is_none());

        let result = fetch_page(&catalog, &ticket).await;
        agg.complete(ticket, result);
        assert_eq!(catalog.page_calls(), 1);
        assert_eq!(ids(&agg), vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_page_routes_by_context() {
        let catalog = StubCatalog::new().with_pages(vec![page_of(1, &[7])]);
        let mut agg = PagedAggregator::new(BrowseContext::Popular);

        let ticket = agg.set_context(BrowseContext::Search("heat".into()));
        fetch_page(&catalog, &ticket).await.unwrap();
        let ticket = agg.set_context(BrowseContext::Genre(28));
        fetch_page(&catalog, &ticket).await.unwrap();

        assert_eq!(
            catalog.requests(),
            vec!["search:heat:1".to_string(), "genre:28:1".to_string()]
        );
    }

    #[test]
    fn test_preserves_per_page_order_with_duplicates() {
        let mut agg = PagedAggregator::new(BrowseContext::Popular);
        let t = agg.fetch_next().unwrap();
        agg.complete(t, Ok(page_of(1, &[3, 1, 2])));
        let t = agg.fetch_next().unwrap();
        agg.complete(t, Ok(page_of(2, &[2, 9])));
        assert_eq!(ids(&agg), vec![3, 1, 2, 2, 9]);
    }
}
