//! Core types for FATMAC Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod condition;
pub mod id;
pub mod price;
pub mod product;

pub use condition::{Condition, ConditionError};
pub use id::*;
pub use price::Price;
pub use product::{CategoryRef, Product, ProductImage, VendorRef};
