//! Application root.
//!
//! A [`Storefront`] is constructed once by the front end and owns the cart
//! store and the API client. Catalog sessions are opened from it per page.

use std::sync::Arc;

use fatmac_core::ProductId;
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::cart::{CartStore, FileStore, KeyValueStore};
use crate::catalog::{AddressBar, CatalogSession, Viewport};
use crate::checkout::{CheckoutError, Customer, OrderDraft, OrderReceipt, PaymentMethod};
use crate::config::StorefrontConfig;
use crate::error::AppError;

/// Shared storefront state.
pub struct Storefront<S> {
    config: StorefrontConfig,
    cart: CartStore<S>,
    api: ApiClient,
}

impl Storefront<FileStore> {
    /// Open a storefront whose cart lives in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be created.
    pub fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let storage = FileStore::new(config.data_dir.clone());
        Self::new(config, storage)
    }
}

impl<S: KeyValueStore> Storefront<S> {
    /// Create a storefront over `storage`, loading any saved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be created.
    pub fn new(config: StorefrontConfig, storage: S) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self::with_api(config, storage, api))
    }

    /// Create a storefront with an existing API client.
    #[must_use]
    pub fn with_api(config: StorefrontConfig, storage: S, api: ApiClient) -> Self {
        let cart = CartStore::load(storage, config.cart_key.clone());
        info!(
            items = cart.items().len(),
            api = %config.api.base_url,
            "Storefront ready"
        );
        Self { config, cart, api }
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Open a catalog page bound to `address`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn catalog<A: AddressBar, V: Viewport>(
        &self,
        address: A,
        viewport: V,
    ) -> CatalogSession<ApiClient, A, V> {
        CatalogSession::with_debounce(
            Arc::new(self.api.clone()),
            address,
            viewport,
            self.config.search_debounce,
        )
    }

    /// Fetch a product and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the product cannot be fetched, or
    /// `AppError::Cart` if the cart rejects it.
    #[instrument(skip(self))]
    pub async fn add_product(&mut self, id: ProductId, quantity: u32) -> Result<u32, AppError> {
        let product = self.api.get_product(id).await?;
        Ok(self.cart.add_item(&product, quantity)?)
    }

    /// Fetch a product and make it the only item in the cart.
    ///
    /// This is the confirmation path of a vendor conflict.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the product cannot be fetched, or
    /// `AppError::Cart` if it is out of stock.
    #[instrument(skip(self))]
    pub async fn replace_cart_with(
        &mut self,
        id: ProductId,
        quantity: u32,
    ) -> Result<u32, AppError> {
        let product = self.api.get_product(id).await?;
        Ok(self.cart.replace_with(&product, quantity)?)
    }

    /// Submit the cart as an order and empty it once accepted.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the cart or customer details are invalid
    /// or the API rejects the order. The cart is kept on error.
    #[instrument(skip(self, customer))]
    pub async fn checkout(
        &mut self,
        customer: &Customer,
        payment_method: PaymentMethod,
    ) -> Result<OrderReceipt, CheckoutError> {
        let draft = OrderDraft::from_cart(&self.cart, customer, payment_method)?;
        let receipt = self.api.create_order(&draft).await?;

        info!(
            order_id = ?receipt.order_id(),
            total = %draft.total,
            "Order placed"
        );
        self.cart.clear();
        Ok(receipt)
    }
}
