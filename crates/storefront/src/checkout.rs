//! Turning a cart into an order.
//!
//! Payment itself happens outside the storefront (the shopper pays the
//! vendor through Yape or Plin); the order only records which method was
//! chosen.

use std::fmt;
use std::str::FromStr;

use fatmac_core::{OrderId, Price, ProductId, VendorId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::cart::{CartStore, KeyValueStore};

/// Errors raised while preparing or submitting an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    /// A required customer field is blank.
    #[error("missing customer field: {0}")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The order was rejected or could not be sent; the cart is kept.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// How the shopper pays the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Yape,
    Plin,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yape => "yape",
            Self::Plin => "plin",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yape" => Ok(Self::Yape),
            "plin" => Ok(Self::Plin),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Contact and delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    fn validate(&self) -> Result<(), CheckoutError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }

        let email = self.email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(CheckoutError::InvalidEmail(email.to_owned()));
        }
        Ok(())
    }
}

/// One ordered product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    pub products: Vec<OrderLine>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: PaymentMethod,
    /// Vendor the order goes to. Derived by the API from the products.
    #[serde(skip)]
    pub vendor_id: Option<VendorId>,
    /// Cart total at submission time, for display.
    #[serde(skip)]
    pub total: Price,
}

impl OrderDraft {
    /// Build an order from the cart's current contents.
    ///
    /// # Errors
    ///
    /// - `EmptyCart` if there is nothing to order
    /// - `MissingField` / `InvalidEmail` if the customer details are incomplete
    pub fn from_cart<S: KeyValueStore>(
        cart: &CartStore<S>,
        customer: &Customer,
        payment_method: PaymentMethod,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        customer.validate()?;

        Ok(Self {
            products: cart
                .items()
                .iter()
                .map(|item| OrderLine {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
            customer_name: customer.name.trim().to_owned(),
            customer_email: customer.email.trim().to_owned(),
            customer_phone: customer.phone.trim().to_owned(),
            customer_address: customer.address.trim().to_owned(),
            payment_method,
            vendor_id: cart.vendor_id(),
            total: cart.total(),
        })
    }
}

/// Response to an accepted order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub message: Option<String>,
    /// The created order (or orders); the shape varies between API versions.
    #[serde(default, alias = "order")]
    pub data: serde_json::Value,
}

impl OrderReceipt {
    /// Id of the created order, if the response carries one.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        let order = match &self.data {
            serde_json::Value::Array(orders) => orders.first()?,
            other => other,
        };
        order.get("id")?.as_i64().map(OrderId::new)
    }
}
