//! The cart store: single source of truth for the shopper's pending purchase.

use fatmac_core::{Price, Product, ProductId, VendorId};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::error::{CartError, PersistenceReadError};
use super::item::CartItem;
use super::storage::KeyValueStore;

/// Capacity of the event channel. Slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 64;

/// Derived read-only view of the cart, published after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub count: u32,
    pub total: Price,
    pub vendor_id: Option<VendorId>,
    pub is_open: bool,
}

/// Notifications for subscribed UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added; drives the transient "added to cart" toast.
    ItemAdded {
        product_id: ProductId,
        name: String,
        quantity: u32,
    },
    /// Items or the open flag changed.
    Changed(CartSummary),
}

/// Shopping cart bound to one vendor at a time.
///
/// Every mutation re-serializes the whole cart into the key-value store
/// under `key`. Write failures are logged and never undo the in-memory
/// change.
pub struct CartStore<S> {
    storage: S,
    key: String,
    items: Vec<CartItem>,
    is_open: bool,
    events: broadcast::Sender<CartEvent>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart stored under `key`, or start empty.
    ///
    /// Missing, unreadable, malformed or inconsistent data all yield an
    /// empty cart; the reason is logged at `warn`.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match read_items(&storage, &key) {
            Ok(items) => items,
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding stored cart");
                Vec::new()
            }
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            key,
            items,
            is_open: false,
            events,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `quantity` is zero
    /// - `OutOfStock` if the product's stock is known and not positive
    /// - `VendorConflict` if the cart holds another vendor's items
    /// - `InsufficientStock` if the line would exceed known stock
    ///
    /// The cart is unchanged on error.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let stock = available_stock(product)?;

        if let Some(first) = self.items.first()
            && first.vendor_id != product.vendor_id()
        {
            return Err(CartError::VendorConflict {
                cart_vendor: first.vendor_id,
                incoming_vendor: product.vendor_id(),
            });
        }

        let line_quantity = if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id)
        {
            let new_quantity = item.quantity.saturating_add(quantity);
            check_stock(product.id, stock, new_quantity)?;
            item.quantity = new_quantity;
            item.stock = stock;
            new_quantity
        } else {
            check_stock(product.id, stock, quantity)?;
            self.items
                .push(CartItem::from_product(product, quantity, stock));
            quantity
        };

        info!(product_id = %product.id, quantity = line_quantity, "Added item to cart");
        self.after_add(product, quantity);
        Ok(line_quantity)
    }

    /// Add a single unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`add_item`](Self::add_item).
    pub fn add_one(&mut self, product: &Product) -> Result<u32, CartError> {
        self.add_item(product, 1)
    }

    /// Discard the cart and start a new one holding only `product`.
    ///
    /// This is the "empty cart and add" answer to a
    /// [`CartError::VendorConflict`]. Stock rules still apply.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `OutOfStock` or `InsufficientStock`; the existing
    /// cart is kept on error.
    pub fn replace_with(&mut self, product: &Product, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let stock = available_stock(product)?;
        check_stock(product.id, stock, quantity)?;

        self.items = vec![CartItem::from_product(product, quantity, stock)];

        info!(product_id = %product.id, quantity, "Replaced cart contents");
        self.after_add(product, quantity);
        Ok(quantity)
    }

    /// Remove a product's line. Absent products are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        let before = self.items.len();
        self.items.retain(|item| item.id != product_id);
        if self.items.len() != before {
            info!(product_id = %product_id, "Removed item from cart");
            self.persist();
            self.publish_changed();
        }
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// `InsufficientStock` if `quantity` exceeds the line's known stock; the
    /// quantity is left unchanged.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        let Some(item) = self.items.iter_mut().find(|i| i.id == product_id) else {
            return Ok(());
        };
        check_stock(product_id, item.stock, quantity)?;
        if item.quantity == quantity {
            return Ok(());
        }
        item.quantity = quantity;

        info!(product_id = %product_id, quantity, "Updated cart quantity");
        self.persist();
        self.publish_changed();
        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        info!("Cleared cart");
        self.persist();
        self.publish_changed();
    }

    /// Show or hide the cart panel.
    pub fn set_open(&mut self, open: bool) {
        if self.is_open != open {
            self.is_open = open;
            self.publish_changed();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    /// The vendor every line belongs to; `None` for an empty cart or
    /// vendorless products.
    #[must_use]
    pub fn vendor_id(&self) -> Option<VendorId> {
        self.items.first().and_then(|item| item.vendor_id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart panel should be shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            count: self.count(),
            total: self.total(),
            vendor_id: self.vendor_id(),
            is_open: self.is_open,
        }
    }

    /// Subscribe to cart notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// The backing store.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn after_add(&mut self, product: &Product, quantity: u32) {
        self.is_open = true;
        self.persist();
        // Sending only fails when nobody is subscribed
        let _ = self.events.send(CartEvent::ItemAdded {
            product_id: product.id,
            name: product.name.clone(),
            quantity,
        });
        self.publish_changed();
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            warn!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }

    fn publish_changed(&self) {
        let _ = self.events.send(CartEvent::Changed(self.summary()));
    }
}

/// Known stock as a quantity bound, rejecting sold-out products.
fn available_stock(product: &Product) -> Result<Option<u32>, CartError> {
    match product.stock {
        None => Ok(None),
        Some(stock) if stock <= 0 => Err(CartError::OutOfStock {
            product_id: product.id,
        }),
        Some(stock) => Ok(Some(u32::try_from(stock).unwrap_or(u32::MAX))),
    }
}

fn check_stock(product_id: ProductId, stock: Option<u32>, quantity: u32) -> Result<(), CartError> {
    match stock {
        Some(available) if quantity > available => Err(CartError::InsufficientStock {
            product_id,
            available,
        }),
        _ => Ok(()),
    }
}

/// Read and validate stored items.
fn read_items<S: KeyValueStore>(
    storage: &S,
    key: &str,
) -> Result<Vec<CartItem>, PersistenceReadError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Vec::new());
    };
    let items: Vec<CartItem> = serde_json::from_str(&raw)?;
    validate_items(&items)?;
    Ok(items)
}

fn validate_items(items: &[CartItem]) -> Result<(), PersistenceReadError> {
    if items.iter().any(|item| item.quantity == 0) {
        return Err(PersistenceReadError::Inconsistent("zero quantity"));
    }
    if items.iter().any(|item| !item.allows(item.quantity)) {
        return Err(PersistenceReadError::Inconsistent("quantity above stock"));
    }
    if let Some(first) = items.first()
        && items.iter().any(|item| item.vendor_id != first.vendor_id)
    {
        return Err(PersistenceReadError::Inconsistent("mixed vendors"));
    }
    for (index, item) in items.iter().enumerate() {
        if items.iter().skip(index + 1).any(|other| other.id == item.id) {
            return Err(PersistenceReadError::Inconsistent("duplicate product"));
        }
    }
    Ok(())
}
