//! Catalog browsing: filters, the query string, and the product listing.
//!
//! [`FilterSync`] keeps a [`FilterState`] and the address bar's query string
//! in step without update loops. Structured filters are written
//! immediately; free-text search is debounced. Every change of the effective
//! state produces one listing request, and [`ListingTracker`] makes sure
//! only the newest response is shown.
//!
//! [`CatalogSession`] wires the synchronizer to an [`AddressBar`], a
//! [`Viewport`] and a [`ListingService`] on a tokio runtime.

mod address;
mod filters;
mod listing;
pub mod pagination;
mod query;
mod selection;
mod session;
mod sync;

pub use address::{AddressBar, MemoryAddressBar, NullViewport, RecordingViewport, Viewport};
pub use filters::{FilterOptions, FilterState, ProductFilters};
pub use listing::{
    LISTING_ERROR_MESSAGE, ListingFailure, ListingPage, ListingService, ListingTracker,
    ListingView, PageMeta, RequestSeq, Resolution,
};
pub use pagination::{PageWindow, page_window};
pub use query::QueryParams;
pub use selection::Selection;
pub use session::CatalogSession;
pub use sync::{Effect, FilterSync, SyncPhase};
