//! FATMAC Core - Shared types library.
//!
//! This crate provides common types used across all FATMAC Shop components:
//! - `storefront` - Cart store, catalog filters and the REST API client
//! - `cli` - Command-line shopper built on the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, conditions and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
