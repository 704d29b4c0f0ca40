//! Product listing requests and last-write-wins resolution.

use std::fmt;
use std::future::Future;

use fatmac_core::Product;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::filters::FilterState;

/// Pagination metadata returned with a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub current_page: u32,
    pub last_page: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            current_page: 1,
            last_page: 1,
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(rename = "data", default)]
    pub items: Vec<Product>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Shown when a service gives no better explanation.
pub const LISTING_ERROR_MESSAGE: &str = "Error al cargar productos";

/// Source of listing pages.
pub trait ListingService: Send + Sync + 'static {
    type Error: fmt::Display + Send + 'static;

    /// Fetch the page of products matching `query`.
    fn list(
        &self,
        query: &FilterState,
    ) -> impl Future<Output = Result<ListingPage, Self::Error>> + Send;

    /// Text for the shopper when a request fails.
    fn user_message(_error: &Self::Error) -> String {
        LISTING_ERROR_MESSAGE.to_string()
    }
}

/// A failed listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFailure {
    /// Shopper-facing text.
    pub message: String,
    /// Diagnostic text from the service error.
    pub detail: String,
}

impl ListingFailure {
    #[must_use]
    pub fn from_error<L: ListingService>(error: &L::Error) -> Self {
        Self {
            message: L::user_message(error),
            detail: error.to_string(),
        }
    }
}

/// Identifies one issued listing request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the product list area should show.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListingView {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight; `previous` is the last page shown, if any.
    Loading { previous: Option<ListingPage> },
    Ready(ListingPage),
    /// The latest request failed. Shown with a manual retry.
    Failed { message: String, detail: String },
}

impl ListingView {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The page to render, if one is available.
    #[must_use]
    pub fn page(&self) -> Option<&ListingPage> {
        match self {
            Self::Ready(page) => Some(page),
            Self::Loading { previous } => previous.as_ref(),
            Self::Idle | Self::Failed { .. } => None,
        }
    }
}

/// Outcome of feeding a response to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer request was issued; the response was dropped.
    Stale,
}

/// Tracks issued requests so only the newest response reaches the view.
#[derive(Debug, Default)]
pub struct ListingTracker {
    latest: Option<RequestSeq>,
    view: ListingView,
}

impl ListingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request and move the view to `Loading`.
    pub fn issue(&mut self) -> RequestSeq {
        let seq = RequestSeq(self.latest.map_or(1, |RequestSeq(n)| n + 1));
        self.latest = Some(seq);

        let previous = match std::mem::take(&mut self.view) {
            ListingView::Ready(page) => Some(page),
            ListingView::Loading { previous } => previous,
            ListingView::Idle | ListingView::Failed { .. } => None,
        };
        self.view = ListingView::Loading { previous };
        seq
    }

    /// Apply a response if it belongs to the latest request.
    pub fn resolve(
        &mut self,
        seq: RequestSeq,
        result: Result<ListingPage, ListingFailure>,
    ) -> Resolution {
        if self.latest != Some(seq) {
            debug!(seq = %seq, latest = ?self.latest, "Discarding stale listing response");
            return Resolution::Stale;
        }

        self.view = match result {
            Ok(page) => ListingView::Ready(page),
            Err(ListingFailure { message, detail }) => {
                tracing::error!(seq = %seq, error = %detail, "Listing request failed");
                ListingView::Failed { message, detail }
            }
        };
        Resolution::Applied
    }

    #[must_use]
    pub const fn view(&self) -> &ListingView {
        &self.view
    }

    #[must_use]
    pub const fn latest(&self) -> Option<RequestSeq> {
        self.latest
    }
}
