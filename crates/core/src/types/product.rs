//! Catalog product snapshot as returned by the listing service.

use serde::{Deserialize, Deserializer, Serialize};

use super::{CategoryId, Condition, Price, ProductId, VendorId};

/// The vendor selling a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRef {
    pub id: VendorId,
    #[serde(default)]
    pub name: Option<String>,
}

/// The category a product is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
}

/// A product at the moment it was fetched.
///
/// `stock` is `None` for products without inventory tracking. The API has
/// been seen to report negative stock after overselling, hence the signed
/// type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub discounted_price: Option<Price>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub vendor: Option<VendorRef>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default, deserialize_with = "lenient_condition")]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Price charged per unit: the discounted price when one is set,
    /// otherwise the base price. A zero discount counts as "not set".
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.discounted_price
            .filter(|discounted| !discounted.is_zero())
            .unwrap_or(self.price)
    }

    /// Vendor id, if the product has a vendor.
    #[must_use]
    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor.as_ref().map(|vendor| vendor.id)
    }

    /// Vendor display name, if known.
    #[must_use]
    pub fn vendor_name(&self) -> Option<&str> {
        self.vendor.as_ref().and_then(|vendor| vendor.name.as_deref())
    }

    /// Returns true if stock is tracked and nothing is left.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.stock.is_some_and(|stock| stock <= 0)
    }

    /// Image to show on cards and cart lines: the first gallery image, else
    /// the legacy single `image_url`.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(|image| image.url.as_str())
            .or(self.image_url.as_deref())
    }
}

/// Unknown condition labels are treated as "not specified" rather than
/// failing the whole product.
fn lenient_condition<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Condition>, D::Error> {
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.and_then(|label| label.parse().ok()))
}
