//! Cart commands.

use fatmac_core::ProductId;
use fatmac_storefront::cart::{CartError, FileStore};
use fatmac_storefront::{AppError, Storefront};
use tracing::{info, warn};

use super::{CliError, say};

/// Print the cart contents and total.
pub fn show(storefront: &Storefront<FileStore>) -> Result<(), CliError> {
    let cart = storefront.cart();
    if cart.is_empty() {
        return say("Tu carrito está vacío");
    }

    if let Some(vendor) = cart.items().first().and_then(|item| item.vendor_name.as_deref()) {
        say(format!("Vendedor: {vendor}"))?;
    }
    for item in cart.items() {
        let stock = item
            .stock
            .map_or_else(String::new, |stock| format!(" (stock {stock})"));
        say(format!(
            "  [{}] {} x{} @ {} = {}{stock}",
            item.id,
            item.name,
            item.quantity,
            item.unit_price,
            item.line_total()
        ))?;
    }
    say(format!("{} productos, total {}", cart.count(), cart.total()))
}

/// Add a product, optionally replacing another vendor's cart.
pub async fn add(
    storefront: &mut Storefront<FileStore>,
    id: ProductId,
    quantity: u32,
    replace: bool,
) -> Result<(), CliError> {
    let added = match storefront.add_product(id, quantity).await {
        Err(AppError::Cart(CartError::VendorConflict { .. })) if replace => {
            warn!(product_id = %id, "Replacing cart contents from another vendor");
            storefront.replace_cart_with(id, quantity).await?
        }
        other => other?,
    };

    info!(product_id = %id, added, "Added to cart");
    say(format!("Producto agregado al carrito (x{added})"))?;
    show(storefront)
}

/// Remove a product from the cart.
pub fn remove(storefront: &mut Storefront<FileStore>, id: ProductId) -> Result<(), CliError> {
    storefront.cart_mut().remove_item(id);
    show(storefront)
}

/// Set a product's quantity.
pub fn set(
    storefront: &mut Storefront<FileStore>,
    id: ProductId,
    quantity: u32,
) -> Result<(), CliError> {
    storefront
        .cart_mut()
        .update_quantity(id, quantity)
        .map_err(AppError::from)?;
    show(storefront)
}

/// Empty the cart.
pub fn clear(storefront: &mut Storefront<FileStore>) -> Result<(), CliError> {
    storefront.cart_mut().clear();
    say("Carrito vaciado")
}
