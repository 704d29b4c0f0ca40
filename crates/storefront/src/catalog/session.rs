//! Async driver for [`FilterSync`].
//!
//! The session applies effects to its collaborators and runs listing
//! requests as tokio tasks. Responses come back through a channel and are
//! resolved in arrival order; the tracker drops anything superseded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use super::address::{AddressBar, Viewport};
use super::filters::{FilterState, ProductFilters};
use super::listing::{
    ListingFailure, ListingPage, ListingService, ListingTracker, ListingView, RequestSeq,
};
use super::query::QueryParams;
use super::sync::{Effect, FilterSync};
use crate::config::DEFAULT_SEARCH_DEBOUNCE;

type Response = (RequestSeq, Result<ListingPage, ListingFailure>);

/// One catalog page: filters, address bar, and the product list it shows.
pub struct CatalogSession<L, A, V> {
    sync: FilterSync,
    tracker: ListingTracker,
    service: Arc<L>,
    address: A,
    viewport: V,
    responses_tx: mpsc::UnboundedSender<Response>,
    responses_rx: mpsc::UnboundedReceiver<Response>,
    in_flight: usize,
}

impl<L, A, V> CatalogSession<L, A, V>
where
    L: ListingService,
    A: AddressBar,
    V: Viewport,
{
    /// Open a session with the default search debounce.
    ///
    /// Must be called inside a tokio runtime: the initial listing request is
    /// spawned immediately.
    pub fn open(service: Arc<L>, address: A, viewport: V) -> Self {
        Self::with_debounce(service, address, viewport, DEFAULT_SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(
        service: Arc<L>,
        address: A,
        viewport: V,
        debounce: std::time::Duration,
    ) -> Self {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            sync: FilterSync::new(address.read(), debounce),
            tracker: ListingTracker::new(),
            service,
            address,
            viewport,
            responses_tx,
            responses_rx,
            in_flight: 0,
        };
        let effects = session.sync.start();
        session.apply(effects);
        session
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn set_filters(&mut self, filters: ProductFilters) {
        let effects = self.sync.set_filters(filters);
        self.apply(effects);
    }

    /// Record a keystroke; the write happens once typing pauses.
    pub fn set_search(&mut self, text: &str) {
        self.sync.set_search(text, Instant::now());
    }

    pub fn set_page(&mut self, page: u32) {
        let effects = self.sync.set_page(page);
        self.apply(effects);
    }

    /// The address bar was changed from outside (back/forward, a link).
    pub fn navigated(&mut self, params: QueryParams) {
        let effects = self.sync.on_navigate(params);
        self.apply(effects);
    }

    /// Request the current listing again after a failure.
    pub fn retry(&mut self) {
        let effects = self.sync.retry();
        self.apply(effects);
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Wait for the next response or debounce deadline and handle it.
    ///
    /// Returns `false` when nothing is pending.
    pub async fn tick(&mut self) -> bool {
        let deadline = self.sync.next_deadline();
        if deadline.is_none() && self.in_flight == 0 {
            return false;
        }

        tokio::select! {
            Some((seq, result)) = self.responses_rx.recv(), if self.in_flight > 0 => {
                self.in_flight -= 1;
                self.tracker.resolve(seq, result);
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let effects = self.sync.poll(Instant::now());
                self.apply(effects);
            }
        }
        true
    }

    /// Handle events until no response or debounce is pending.
    pub async fn run_until_idle(&mut self) {
        while self.tick().await {}
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn view(&self) -> &ListingView {
        self.tracker.view()
    }

    #[must_use]
    pub const fn state(&self) -> &FilterState {
        self.sync.state()
    }

    #[must_use]
    pub fn search_input(&self) -> &str {
        self.sync.search_input()
    }

    #[must_use]
    pub const fn sync(&self) -> &FilterSync {
        &self.sync
    }

    #[must_use]
    pub const fn address(&self) -> &A {
        &self.address
    }

    /// Mutable access for driving history (back/forward) in tests and the
    /// CLI. Feed the resulting query to [`navigated`](Self::navigated).
    pub const fn address_mut(&mut self) -> &mut A {
        &mut self.address
    }

    #[must_use]
    pub const fn viewport(&self) -> &V {
        &self.viewport
    }

    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::WriteQuery { params, replace } => self.address.write(&params, replace),
                Effect::ScrollToTop => self.viewport.scroll_to_top(),
                Effect::RequestListing(query) => self.spawn_request(query),
            }
        }
    }

    fn spawn_request(&mut self, query: FilterState) {
        let seq = self.tracker.issue();
        let service = Arc::clone(&self.service);
        let tx = self.responses_tx.clone();
        self.in_flight += 1;

        debug!(seq = %seq, query = %query.to_query(), "Requesting listing");
        tokio::spawn(async move {
            let result = service
                .list(&query)
                .await
                .map_err(|e| ListingFailure::from_error::<L>(&e));
            // The session may have been dropped
            let _ = tx.send((seq, result));
        });
    }
}
