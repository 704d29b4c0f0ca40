//! FATMAC Shop storefront library.
//!
//! The client-side core of the marketplace storefront: the single-vendor
//! cart, catalog filter/query synchronization, and a typed client for the
//! marketplace REST API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;

pub use error::AppError;
pub use state::Storefront;
