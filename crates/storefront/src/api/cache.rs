//! Cache types for REST API responses.

use fatmac_core::{CategoryRef, Product, ProductId, VendorRef};

use crate::catalog::ListingPage;

/// Cache key for listings and products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// A listing, keyed by its encoded query string.
    Products { query: String },
    Product(ProductId),
    Categories,
    ApprovedVendors,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ListingPage),
    Product(Box<Product>),
    Categories(Vec<CategoryRef>),
    Vendors(Vec<VendorRef>),
}
