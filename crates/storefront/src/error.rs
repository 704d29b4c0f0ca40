//! Unified error handling.
//!
//! Provides an `AppError` type that aggregates the module errors so front
//! ends (the CLI, an embedding UI) can handle them in one place and show
//! the shopper a readable message.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Marketplace API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message suitable for a toast or prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(err) => cart_message(err),
            Self::Api(err) | Self::Checkout(CheckoutError::Api(err)) => err.user_message(),
            Self::Checkout(CheckoutError::EmptyCart) => "Tu carrito está vacío".to_string(),
            Self::Checkout(CheckoutError::MissingField(field)) => {
                format!("Completa el campo requerido: {field}")
            }
            Self::Checkout(CheckoutError::InvalidEmail(email)) => {
                format!("El correo {email} no es válido")
            }
            Self::Config(err) => err.to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }

    /// Returns true if retrying the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Http(_) | ApiError::RateLimited(_))
                | Self::Checkout(CheckoutError::Api(
                    ApiError::Http(_) | ApiError::RateLimited(_)
                ))
        )
    }
}

fn cart_message(err: &CartError) -> String {
    match err {
        CartError::OutOfStock { .. } => "Este producto no tiene stock disponible".to_string(),
        CartError::VendorConflict { .. } => "Tu carrito ya contiene productos de otro vendedor. \
             Finaliza tu compra actual o vacía el carrito para agregar productos de otro vendedor."
            .to_string(),
        CartError::InsufficientStock { available, .. } => {
            format!("No hay suficiente stock. Stock disponible: {available}")
        }
        CartError::InvalidQuantity => "La cantidad debe ser al menos 1".to_string(),
    }
}
