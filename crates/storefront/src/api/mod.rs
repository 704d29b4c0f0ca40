//! Marketplace REST API client.
//!
//! # Endpoints
//!
//! - `GET /products?<filters>` - one listing page, `{ data, meta }`
//! - `GET /products/{id}` - one product, `{ data }`
//! - `GET /categories` - all categories, `{ data }`
//! - `GET /vendors?status=approved` - vendors shown in the filter sidebar, `{ data }`
//! - `POST /orders` - submit an order
//!
//! Listings and products are cached in memory using `moka` (TTL from
//! [`ApiConfig::cache_ttl`]). Submitting an order clears the cache, since
//! stock has changed.
//!
//! # Example
//!
//! ```rust,ignore
//! use fatmac_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let page = client.list_products(&FilterState::default()).await?;
//! let product = client.get_product(page.items[0].id).await?;
//! ```

mod cache;
mod error;

pub use error::ApiError;

use std::sync::Arc;

use fatmac_core::{CategoryRef, Product, ProductId, VendorRef};
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::catalog::{FilterOptions, FilterState, ListingPage, ListingService};
use crate::checkout::{OrderDraft, OrderReceipt};
use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Single-resource response wrapper.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Collection response wrapper; a missing `data` is an empty list.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListEnvelope<T> {
    #[serde(default)]
    data: Vec<T>,
}

/// Error body as sent by the API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    requires_login: bool,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("fatmac/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Fetch one page of products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &FilterState) -> Result<ListingPage, ApiError> {
        let encoded = query.to_query().to_string();
        let cache_key = CacheKey::Products {
            query: encoded.clone(),
        };

        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut url = self.endpoint("products")?;
        if !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }

        let page: ListingPage = self.send(self.inner.client.get(url)).await?;
        debug!(
            count = page.items.len(),
            total = page.meta.total,
            "Fetched product listing"
        );

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let Envelope { data: product } = self
            .send::<Envelope<Product>>(self.inner.client.get(url))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Fetch every category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryRef>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint("categories")?;
        let ListEnvelope { data: categories } = self
            .send::<ListEnvelope<CategoryRef>>(self.inner.client.get(url))
            .await?;
        debug!(count = categories.len(), "Fetched categories");

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Fetch the vendors whose products can be listed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn list_approved_vendors(&self) -> Result<Vec<VendorRef>, ApiError> {
        if let Some(CacheValue::Vendors(vendors)) =
            self.inner.cache.get(&CacheKey::ApprovedVendors).await
        {
            debug!("Cache hit for vendors");
            return Ok(vendors);
        }

        let mut url = self.endpoint("vendors")?;
        url.set_query(Some("status=approved"));
        let ListEnvelope { data: vendors } = self
            .send::<ListEnvelope<VendorRef>>(self.inner.client.get(url))
            .await?;
        debug!(count = vendors.len(), "Fetched approved vendors");

        self.inner
            .cache
            .insert(CacheKey::ApprovedVendors, CacheValue::Vendors(vendors.clone()))
            .await;
        Ok(vendors)
    }

    /// Categories and vendors for the filter sidebar.
    ///
    /// Both are fetched concurrently. A list that fails to load is logged and
    /// left empty; the other one is still returned.
    pub async fn filter_options(&self) -> FilterOptions {
        let (categories, vendors) = tokio::join!(self.list_categories(), self.list_approved_vendors());

        FilterOptions {
            categories: categories.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load categories");
                Vec::new()
            }),
            vendors: vendors.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load vendors");
                Vec::new()
            }),
        }
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequiresLogin` if the customer email belongs to an
    /// existing account, or another `ApiError` if the order was not accepted.
    #[instrument(skip(self, draft), fields(lines = draft.products.len()))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, ApiError> {
        let url = self.endpoint("orders")?;
        let receipt: OrderReceipt = self.send(self.inner.client.post(url).json(draft)).await?;

        // Stock changed
        self.inner.cache.invalidate_all();
        Ok(receipt)
    }

    /// Drop all cached listings and products.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Absolute URL for an image path returned by the API.
    #[must_use]
    pub fn image_url(&self, path: &str) -> Option<String> {
        resolve_image_url(&self.inner.base_url, path)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let path = response.url().path().to_owned();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(error_from_body(status.as_u16(), &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl ListingService for ApiClient {
    type Error = ApiError;

    async fn list(&self, query: &FilterState) -> Result<ListingPage, ApiError> {
        self.list_products(query).await
    }

    fn user_message(error: &ApiError) -> String {
        error.user_message()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Build an error from a non-success body, keeping the API's own message.
fn error_from_body(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    if parsed.requires_login {
        ApiError::RequiresLogin(message)
    } else {
        ApiError::Status { status, message }
    }
}

/// Resolve an image path against the host serving the API.
///
/// Images are served from `/storage` next to (not under) the `/api` prefix.
/// Absolute URLs pass through; blank paths have no image.
fn resolve_image_url(api_base: &Url, path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_owned());
    }

    let base = api_base.as_str().trim_end_matches('/');
    let base = base.strip_suffix("/api").unwrap_or(base);

    let url = if path.starts_with("/storage/") {
        format!("{base}{path}")
    } else if let Some(relative) = path.strip_prefix('/') {
        format!("{base}/storage/{relative}")
    } else {
        format!("{base}/storage/{path}")
    };
    Some(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base_url).unwrap(),
            token: None,
            cache_ttl: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let client = ApiClient::new(&config("https://fatmac.pe/api/")).unwrap();
        assert_eq!(
            client.endpoint("products/12").unwrap().as_str(),
            "https://fatmac.pe/api/products/12"
        );
    }

    #[test]
    fn test_image_url_resolution() {
        let base = Url::parse("http://localhost:8000/api/").unwrap();

        assert_eq!(resolve_image_url(&base, ""), None);
        assert_eq!(
            resolve_image_url(&base, "https://cdn.fatmac.pe/a.jpg").as_deref(),
            Some("https://cdn.fatmac.pe/a.jpg")
        );
        assert_eq!(
            resolve_image_url(&base, "/storage/products/a.jpg").as_deref(),
            Some("http://localhost:8000/storage/products/a.jpg")
        );
        assert_eq!(
            resolve_image_url(&base, "products/a.jpg").as_deref(),
            Some("http://localhost:8000/storage/products/a.jpg")
        );
        assert_eq!(
            resolve_image_url(&base, "/products/a.jpg").as_deref(),
            Some("http://localhost:8000/storage/products/a.jpg")
        );
    }

    #[test]
    fn test_error_from_body_uses_api_message() {
        let err = error_from_body(422, r#"{"message":"Stock insuficiente","errors":{}}"#);
        assert!(matches!(
            err,
            ApiError::Status { status: 422, ref message } if message == "Stock insuficiente"
        ));

        let err = error_from_body(409, r#"{"message":"Correo registrado","requires_login":true}"#);
        assert!(matches!(err, ApiError::RequiresLogin(_)));

        let err = error_from_body(500, "Server Error");
        assert!(matches!(
            err,
            ApiError::Status { ref message, .. } if message == "Server Error"
        ));
    }
}
