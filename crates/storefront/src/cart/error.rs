//! Cart error types.

use fatmac_core::{ProductId, VendorId};
use thiserror::Error;

/// Validation failures returned by cart mutations.
///
/// None of these leave the cart partially modified; the caller decides how
/// to present them (toast, confirmation prompt) and whether to try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product has no stock left.
    #[error("product {product_id} is out of stock")]
    OutOfStock { product_id: ProductId },

    /// The cart already holds items from another vendor.
    ///
    /// Resolve with [`CartStore::replace_with`](super::CartStore::replace_with)
    /// or leave the cart as it is.
    #[error(
        "cart holds items from {} and cannot take items from {}",
        describe_vendor(.cart_vendor),
        describe_vendor(.incoming_vendor)
    )]
    VendorConflict {
        cart_vendor: Option<VendorId>,
        incoming_vendor: Option<VendorId>,
    },

    /// The requested quantity exceeds known stock.
    #[error("insufficient stock for product {product_id}: {available} available")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
    },

    /// Quantities added to a cart must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

#[allow(clippy::ref_option)]
fn describe_vendor(vendor: &Option<VendorId>) -> String {
    vendor.map_or_else(|| "no vendor".to_string(), |id| format!("vendor {id}"))
}

/// Stored cart data that could not be used.
///
/// Never returned to callers: loading degrades to an empty cart and logs
/// this instead.
#[derive(Debug, Error)]
pub enum PersistenceReadError {
    /// The key-value store itself failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored text is not a JSON array of cart items.
    #[error("malformed cart data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stored items parse but break a cart invariant.
    #[error("inconsistent cart data: {0}")]
    Inconsistent(&'static str),
}

/// Errors raised by [`KeyValueStore`](super::KeyValueStore) implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Keys become file names, so only a safe subset of characters is allowed.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
