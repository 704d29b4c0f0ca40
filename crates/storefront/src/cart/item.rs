//! Cart line items.

use fatmac_core::{Price, Product, ProductId, VendorId};
use serde::{Deserialize, Serialize};

/// One product line in the cart.
///
/// This is also the persisted shape: the cart is stored as a JSON array of
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id, unique within a cart.
    pub id: ProductId,
    /// Selling vendor, if the product has one.
    pub vendor_id: Option<VendorId>,
    /// Vendor display name, carried for prompts.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Price charged per unit.
    pub unit_price: Price,
    /// Units of this product in the cart.
    pub quantity: u32,
    /// Stock known when the item last entered the cart; `None` is unlimited.
    pub stock: Option<u32>,
    /// Product name for display.
    pub name: String,
    /// Cover image path for display.
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Build a line from a product snapshot.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32, stock: Option<u32>) -> Self {
        Self {
            id: product.id,
            vendor_id: product.vendor_id(),
            vendor_name: product.vendor_name().map(str::to_owned),
            unit_price: product.unit_price(),
            quantity,
            stock,
            name: product.name.clone(),
            image: product.cover_image().map(str::to_owned),
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Returns true if `quantity` fits within the known stock.
    #[must_use]
    pub fn allows(&self, quantity: u32) -> bool {
        self.stock.is_none_or(|stock| quantity <= stock)
    }
}
