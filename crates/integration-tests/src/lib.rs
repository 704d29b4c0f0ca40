//! Integration test support for FATMAC Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fatmac-integration-tests
//! ```
//!
//! Nothing external is needed: the marketplace API is replaced either by
//! [`FakeListingService`] (catalog sessions) or by a [`StubServer`], an axum
//! router on a loopback port (the real `ApiClient`).
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart store scenarios and persistence
//! - `catalog_sync` - Filter/query synchronization against a slow service
//! - `api_client` - REST client and storefront checkout over HTTP

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use fatmac_core::{
    CategoryId, CategoryRef, Condition, Price, Product, ProductId, VendorId, VendorRef,
};
use fatmac_storefront::catalog::{FilterState, ListingPage, ListingService, PageMeta};
use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// =============================================================================
// Products
// =============================================================================

/// Builds product snapshots for tests.
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    /// A product priced at `cents`, with no stock limit and no vendor.
    #[must_use]
    pub fn new(id: i64, name: &str, cents: i64) -> Self {
        Self {
            product: Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                description: None,
                price: Price::from_cents(cents),
                discounted_price: None,
                stock: None,
                vendor: None,
                category: None,
                condition: None,
                image_url: None,
                images: Vec::new(),
            },
        }
    }

    #[must_use]
    pub const fn stock(mut self, stock: i64) -> Self {
        self.product.stock = Some(stock);
        self
    }

    #[must_use]
    pub fn vendor(mut self, id: i64, name: &str) -> Self {
        self.product.vendor = Some(VendorRef {
            id: VendorId::new(id),
            name: Some(name.to_owned()),
        });
        self
    }

    #[must_use]
    pub fn category(mut self, id: i64) -> Self {
        self.product.category = Some(CategoryRef {
            id: CategoryId::new(id),
            name: None,
        });
        self
    }

    #[must_use]
    pub fn discounted(mut self, cents: i64) -> Self {
        self.product.discounted_price = Some(Price::from_cents(cents));
        self
    }

    #[must_use]
    pub const fn condition(mut self, condition: Condition) -> Self {
        self.product.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn build(self) -> Product {
        self.product
    }
}

// =============================================================================
// Fake listing service
// =============================================================================

/// In-memory listing service with scripted latency.
///
/// Each request takes the next delay from the script (zero once it runs
/// out), records the query it was asked for, and answers with the products
/// whose name contains the search text and whose category matches.
#[derive(Debug, Default)]
pub struct FakeListingService {
    products: Vec<Product>,
    per_page: usize,
    delays: Mutex<VecDeque<Duration>>,
    failures: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<FilterState>>,
}

impl FakeListingService {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            per_page: 12,
            ..Self::default()
        }
    }

    /// Latency of the next requests, in issue order.
    #[must_use]
    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        lock(&self.delays).extend(delays);
        self
    }

    #[must_use]
    pub const fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Make the next request fail.
    pub fn fail_next(&self) {
        lock(&self.failures).push_back(true);
    }

    /// Queries received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<FilterState> {
        lock(&self.calls).clone()
    }

    fn page_for(&self, query: &FilterState) -> ListingPage {
        let search = query.search.to_lowercase();
        let matching: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| search.is_empty() || p.name.to_lowercase().contains(&search))
            .filter(|p| {
                let categories = query.filters.category.as_slice();
                categories.is_empty()
                    || p.category.as_ref().is_some_and(|c| categories.contains(&c.id))
            })
            .collect();

        let per_page = self.per_page.max(1);
        let last_page = matching.len().div_ceil(per_page).max(1);
        let start = usize::try_from(query.page.saturating_sub(1)).unwrap_or(0) * per_page;

        ListingPage {
            items: matching
                .iter()
                .skip(start)
                .take(per_page)
                .map(|p| (*p).clone())
                .collect(),
            meta: PageMeta {
                total: matching.len() as u64,
                current_page: query.page,
                last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            },
        }
    }
}

impl ListingService for FakeListingService {
    type Error = String;

    async fn list(&self, query: &FilterState) -> Result<ListingPage, String> {
        lock(&self.calls).push(query.clone());
        let delay = lock(&self.delays).pop_front().unwrap_or_default();
        let fail = lock(&self.failures).pop_front().unwrap_or(false);

        tokio::time::sleep(delay).await;
        if fail {
            return Err("listing service unavailable".to_string());
        }
        Ok(self.page_for(query))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Stub HTTP server
// =============================================================================

/// A request received by [`StubServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query, e.g. `/api/products?page=2`.
    pub target: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(&self.target, |(path, _)| path)
    }

    /// Query string without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        self.target.split_once('?').map_or("", |(_, query)| query)
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

type Handler = dyn Fn(&RecordedRequest) -> StubResponse + Send + Sync;

#[derive(Clone)]
struct StubState {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Loopback HTTP server answering every request through one handler.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Bind a loopback port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if no port can be bound.
    pub async fn start(
        handler: impl Fn(&RecordedRequest) -> StubResponse + Send + Sync + 'static,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = StubState {
            handler: Arc::new(handler),
            requests: Arc::clone(&requests),
        };
        let router = Router::new().fallback(respond).with_state(state);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Record the request, then answer with the handler's canned response.
async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), ToString::to_string),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let canned = (state.handler)(&request);
    lock(&state.requests).push(request);

    let mut response = Response::builder()
        .status(canned.status)
        .header(CONTENT_TYPE, "application/json");
    for (name, value) in &canned.headers {
        response = response.header(name.as_str(), value.as_str());
    }
    response
        .body(Body::from(canned.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
