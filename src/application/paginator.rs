//! Incremental pagination over catalog search results.
//!
//! [`Paginator`] owns the page cursor and the [`ItemStore`], sequences page
//! fetches through an [`ItemServicePort`], and reports every state change to
//! subscribers in order.
//!
//! At most one fetch is in flight. [`Paginator::fetch_next_page`] is a no-op
//! while a fetch is running, whereas [`Paginator::fetch_first_page`] always
//! wins: it aborts the running fetch and any late reply from it is dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, trace, warn};

use crate::domain::ItemStore;
use crate::domain::entities::{Item, ItemId, ItemPage, PageToken};
use crate::domain::errors::FetchError;
use crate::domain::ports::ItemServicePort;

/// Failure reported through [`PaginatorState::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginatorError {
    /// Retrieving a page failed.
    #[error("failed to fetch items")]
    ItemsFetchFailed,
}

/// Loading state exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginatorState {
    /// The first page is being fetched.
    #[default]
    InitialLoading,
    /// A subsequent page is being fetched.
    Loading,
    /// A page arrived and more pages remain.
    FinishedLoading,
    /// A page arrived and it was the last one.
    LoadedAllItems,
    /// The last fetch failed. Store and cursor are unchanged.
    Error(PaginatorError),
}

impl PaginatorState {
    /// Whether a fetch is running.
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(self, Self::InitialLoading | Self::Loading)
    }

    /// Whether the last fetch failed.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorEvent {
    /// Lifecycle state changed.
    StateChanged(PaginatorState),
    /// The query echoed by the last page changed.
    QueryChanged(String),
    /// Identifiers of the page just merged, in response order.
    PageAppended(Vec<ItemId>),
}

struct InFlight {
    generation: u64,
    abort: Option<AbortHandle>,
}

#[derive(Default)]
struct Inner {
    store: ItemStore,
    state: PaginatorState,
    last_query: String,
    last_fetched_ids: Vec<ItemId>,
    cursor: Option<PageToken>,
    generation: u64,
    in_flight: Option<InFlight>,
    subscribers: Vec<mpsc::UnboundedSender<PaginatorEvent>>,
}

impl Inner {
    fn emit(&mut self, event: &PaginatorEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn set_state(&mut self, state: PaginatorState) {
        if self.state != state {
            self.state = state;
            self.emit(&PaginatorEvent::StateChanged(state));
        }
    }

    /// Registers a new fetch, cancelling nothing. Returns its generation.
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            abort: None,
        });
        self.generation
    }

    fn apply_page(&mut self, page: ItemPage) {
        let ids: Vec<ItemId> = page.items.iter().map(|item| item.id().clone()).collect();
        let inserted = self.store.append(page.items);
        self.last_fetched_ids.clone_from(&ids);

        if self.last_query != page.query {
            self.last_query.clone_from(&page.query);
            self.emit(&PaginatorEvent::QueryChanged(page.query));
        }

        self.cursor = page.next_page_token;
        debug!(
            received = ids.len(),
            inserted,
            total = self.store.count(),
            next = ?self.cursor,
            "Merged search page"
        );
        self.emit(&PaginatorEvent::PageAppended(ids));

        if self.cursor.is_none() {
            self.set_state(PaginatorState::LoadedAllItems);
        } else {
            self.set_state(PaginatorState::FinishedLoading);
        }
    }
}

/// Cloneable handle to a search pagination session.
///
/// Fetch methods must be called from within a tokio runtime.
#[derive(Clone)]
pub struct Paginator {
    inner: Arc<Mutex<Inner>>,
    service: Arc<dyn ItemServicePort>,
    query: Arc<str>,
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Paginator")
            .field("query", &self.query)
            .field("state", &inner.state)
            .field("cursor", &inner.cursor)
            .field("items", &inner.store.count())
            .finish_non_exhaustive()
    }
}

impl Paginator {
    /// Creates a paginator searching for `query`, positioned at the first page.
    #[must_use]
    pub fn new(service: Arc<dyn ItemServicePort>, query: impl Into<String>) -> Self {
        let inner = Inner {
            cursor: Some(PageToken::first()),
            ..Inner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            service,
            query: Arc::from(query.into()),
        }
    }

    /// Subscribes to state changes. The current state is delivered first.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PaginatorEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let _ = tx.send(PaginatorEvent::StateChanged(inner.state));
        inner.subscribers.push(tx);
        rx
    }

    /// Restarts from the first page, superseding any fetch in flight.
    ///
    /// The state is `InitialLoading` by the time this returns.
    pub fn fetch_first_page(&self) -> JoinHandle<()> {
        let page = PageToken::first();
        let generation = {
            let mut inner = self.inner.lock();
            if let Some(previous) = inner.in_flight.take() {
                debug!(generation = previous.generation, "Superseding in-flight fetch");
                if let Some(abort) = previous.abort {
                    abort.abort();
                }
            }
            inner.cursor = Some(page.clone());
            inner.set_state(PaginatorState::InitialLoading);
            inner.begin()
        };

        info!(query = %self.query, "Fetching first page");
        self.spawn_fetch(generation, page)
    }

    /// Fetches the page at the stored cursor.
    ///
    /// Returns `None` without side effects if results are exhausted or a
    /// fetch is already in flight.
    pub fn fetch_next_page(&self) -> Option<JoinHandle<()>> {
        let (generation, page) = {
            let mut inner = self.inner.lock();
            if inner.in_flight.is_some() {
                trace!("Fetch already in flight, ignoring next page request");
                return None;
            }
            let Some(page) = inner.cursor.clone() else {
                trace!("No next page");
                return None;
            };
            inner.set_state(PaginatorState::Loading);
            (inner.begin(), page)
        };

        debug!(page = %page, "Fetching next page");
        Some(self.spawn_fetch(generation, page))
    }

    fn spawn_fetch(&self, generation: u64, page: PageToken) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let service = self.service.clone();
        let query = self.query.clone();

        let handle = tokio::spawn(async move {
            let result = service.fetch_page(&page, &query).await;
            Self::complete(&inner, generation, &page, result);
        });

        let mut guard = self.inner.lock();
        if let Some(in_flight) = guard.in_flight.as_mut()
            && in_flight.generation == generation
        {
            in_flight.abort = Some(handle.abort_handle());
        }
        handle
    }

    fn complete(
        inner: &Mutex<Inner>,
        generation: u64,
        page: &PageToken,
        result: Result<ItemPage, FetchError>,
    ) {
        let mut inner = inner.lock();
        if inner.generation != generation {
            debug!(page = %page, generation, "Discarding superseded page reply");
            return;
        }
        inner.in_flight = None;

        match result {
            Ok(items) => inner.apply_page(items),
            Err(e) => {
                warn!(page = %page, error = %e, "Failed to fetch search page");
                inner.set_state(PaginatorState::Error(PaginatorError::ItemsFetchFailed));
            }
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PaginatorState {
        self.inner.lock().state
    }

    /// Query as last echoed by the catalog.
    #[must_use]
    pub fn last_query(&self) -> String {
        self.inner.lock().last_query.clone()
    }

    /// The echoed query with each word capitalized, for headers.
    #[must_use]
    pub fn display_query(&self) -> String {
        capitalize_words(&self.inner.lock().last_query)
    }

    /// Identifiers of the most recent page, in response order.
    #[must_use]
    pub fn last_fetched_ids(&self) -> Vec<ItemId> {
        self.inner.lock().last_fetched_ids.clone()
    }

    /// Token of the next page, `None` once all items are loaded.
    #[must_use]
    pub fn cursor(&self) -> Option<PageToken> {
        self.inner.lock().cursor.clone()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.inner.lock().in_flight.is_some()
    }

    /// Looks up a stored item.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<Item> {
        self.inner.lock().store.lookup(id).cloned()
    }

    /// Number of distinct stored items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inner.lock().store.count()
    }

    /// Runs `f` on a snapshot of the item store.
    ///
    /// The lock is released before `f` runs, so `f` may call back into the
    /// paginator.
    pub fn with_items<R>(&self, f: impl FnOnce(&ItemStore) -> R) -> R {
        let store = self.inner.lock().store.clone();
        f(&store)
    }

    /// Returns true if `row` is the last loaded row, i.e. displaying it
    /// should trigger the next page.
    #[must_use]
    pub fn is_last_row(&self, row: usize) -> bool {
        row + 1 == self.item_count()
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
