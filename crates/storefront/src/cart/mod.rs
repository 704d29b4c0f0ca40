//! Shopping cart.
//!
//! # Rules
//!
//! - A cart holds products from a single vendor. Adding another vendor's
//!   product returns [`CartError::VendorConflict`]; the caller either keeps
//!   the cart or calls [`CartStore::replace_with`].
//! - Quantities are positive and never exceed the stock known when the
//!   product entered the cart.
//! - The cart survives restarts through a [`KeyValueStore`]. Unusable stored
//!   data means an empty cart, never an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use fatmac_storefront::cart::{CartStore, MemoryStore};
//!
//! let mut cart = CartStore::load(MemoryStore::new(), "fatmac_cart");
//! cart.add_one(&product)?;
//! println!("{} items, {}", cart.count(), cart.total());
//! ```

mod error;
mod item;
mod storage;
mod store;

pub use error::{CartError, PersistenceReadError, StorageError};
pub use item::CartItem;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CartEvent, CartStore, CartSummary};
