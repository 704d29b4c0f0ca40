//! Two-way synchronization between [`FilterState`] and the query string.
//!
//! [`FilterSync`] is a plain state machine: every operation updates the
//! state and returns the [`Effect`]s the caller must apply (write the
//! address bar, scroll, request a listing). It never touches a clock or a
//! collaborator itself, which is what makes the debounce testable.
//!
//! Loop prevention:
//! - while applying a navigation (`ApplyingFromUrl`) no query write is
//!   emitted;
//! - a navigation that echoes this component's own last write is ignored;
//! - a write identical to the current query string is skipped;
//! - a listing request is only emitted when the effective state differs from
//!   the one last requested.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::filters::{FilterState, ProductFilters};
use super::query::QueryParams;

/// Which side is currently driving the filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// Internal state is being replaced from the address bar.
    ApplyingFromUrl,
    /// A user change has not reached the address bar yet (search debounce).
    ApplyingFromUser,
}

/// Side effect requested by [`FilterSync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Rewrite the address bar query string.
    WriteQuery { params: QueryParams, replace: bool },
    ScrollToTop,
    /// Fetch the listing for this snapshot.
    RequestListing(FilterState),
}

#[derive(Debug)]
pub struct FilterSync {
    state: FilterState,
    search_input: String,
    url: QueryParams,
    last_written: Option<QueryParams>,
    last_requested: Option<FilterState>,
    search_deadline: Option<Instant>,
    debounce: Duration,
    phase: SyncPhase,
}

impl FilterSync {
    /// Create a synchronizer for an address bar currently showing `url`.
    ///
    /// Call [`start`](Self::start) to get the initial listing request.
    #[must_use]
    pub fn new(url: QueryParams, debounce: Duration) -> Self {
        let state = FilterState::from_query(&url);
        Self {
            search_input: state.search.clone(),
            state,
            url,
            last_written: None,
            last_requested: None,
            search_deadline: None,
            debounce,
            phase: SyncPhase::Idle,
        }
    }

    /// Effects for the initial page load.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.request(&mut effects);
        effects
    }

    // =========================================================================
    // User input
    // =========================================================================

    /// Replace the structured filters and go back to page 1.
    ///
    /// The query string is written immediately, together with whatever is in
    /// the search box, so a pending search debounce is settled here.
    pub fn set_filters(&mut self, filters: ProductFilters) -> Vec<Effect> {
        self.phase = SyncPhase::ApplyingFromUser;
        self.search_deadline = None;

        self.state = FilterState::new(filters, &self.search_input, 1);

        let mut effects = Vec::new();
        self.write(&mut effects);
        self.request(&mut effects);
        self.phase = SyncPhase::Idle;
        effects
    }

    /// Record a keystroke in the search box.
    ///
    /// Nothing is written until [`poll`](Self::poll) is called at or after
    /// `now + debounce`; each call pushes that deadline back.
    pub fn set_search(&mut self, text: &str, now: Instant) {
        text.clone_into(&mut self.search_input);
        self.search_deadline = Some(now + self.debounce);
        self.phase = SyncPhase::ApplyingFromUser;
    }

    /// Go to page `page` (at least 1), keeping every other field.
    pub fn set_page(&mut self, page: u32) -> Vec<Effect> {
        self.phase = SyncPhase::ApplyingFromUser;
        self.state.page = page.max(1);

        let mut effects = Vec::new();
        self.write(&mut effects);
        effects.push(Effect::ScrollToTop);
        self.request(&mut effects);

        // A pending search keeps its own deadline
        self.phase = if self.search_deadline.is_some() {
            SyncPhase::ApplyingFromUser
        } else {
            SyncPhase::Idle
        };
        effects
    }

    /// Fire the search debounce if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(deadline) = self.search_deadline else {
            return effects;
        };
        if now < deadline {
            return effects;
        }
        self.search_deadline = None;

        let search = self.search_input.trim();
        if search == self.state.search {
            debug!(search, "Search unchanged, skipping query write");
            self.phase = SyncPhase::Idle;
            return effects;
        }

        self.state = FilterState::new(self.state.filters.clone(), search, 1);
        self.write(&mut effects);
        self.request(&mut effects);
        self.phase = SyncPhase::Idle;
        effects
    }

    /// Re-issue the current listing request, typically after a failure.
    pub fn retry(&mut self) -> Vec<Effect> {
        self.last_requested = None;
        let mut effects = Vec::new();
        self.request(&mut effects);
        effects
    }

    // =========================================================================
    // Address bar input
    // =========================================================================

    /// The address bar changed for a reason other than our own write
    /// (back/forward, a link, a manual edit).
    pub fn on_navigate(&mut self, params: QueryParams) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self.last_written.take().is_some_and(|own| own == params) {
            debug!(query = %params, "Ignoring navigation echo of own write");
            self.url = params;
            return effects;
        }

        self.phase = SyncPhase::ApplyingFromUrl;
        info!(query = %params, "Applying filters from address bar");

        self.state = FilterState::from_query(&params);
        self.state.search.clone_into(&mut self.search_input);
        self.search_deadline = None;
        self.url = params;

        // Writes are suppressed in this phase
        self.write(&mut effects);
        self.request(&mut effects);
        self.phase = SyncPhase::Idle;
        effects
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Effective filter state (what was last written or navigated to).
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Raw search box contents, possibly ahead of [`state`](Self::state).
    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Query string as last seen or written.
    #[must_use]
    pub const fn url(&self) -> &QueryParams {
        &self.url
    }

    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// When [`poll`](Self::poll) next has work to do.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.search_deadline
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn write(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == SyncPhase::ApplyingFromUrl {
            return;
        }
        let params = self.state.to_query();
        if params == self.url {
            return;
        }

        info!(query = %params, "Writing filters to address bar");
        self.url = params.clone();
        self.last_written = Some(params.clone());
        effects.push(Effect::WriteQuery {
            params,
            replace: true,
        });
    }

    fn request(&mut self, effects: &mut Vec<Effect>) {
        if self.last_requested.as_ref() == Some(&self.state) {
            return;
        }
        self.last_requested = Some(self.state.clone());
        effects.push(Effect::RequestListing(self.state.clone()));
    }
}
