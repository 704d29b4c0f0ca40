//! Checkout command.

use fatmac_storefront::cart::FileStore;
use fatmac_storefront::checkout::Customer;
use fatmac_storefront::{AppError, Storefront};

use super::{CliError, say};
use crate::CheckoutArgs;

/// Submit the cart as an order.
pub async fn run(
    storefront: &mut Storefront<FileStore>,
    args: &CheckoutArgs,
) -> Result<(), CliError> {
    let customer = Customer {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        address: args.address.clone(),
    };
    let total = storefront.cart().total();

    let receipt = storefront
        .checkout(&customer, args.payment)
        .await
        .map_err(AppError::from)?;

    match receipt.order_id() {
        Some(id) => say(format!("Pedido #{id} registrado ({total}, pago con {})", args.payment))?,
        None => say(format!("Pedido registrado ({total}, pago con {})", args.payment))?,
    }
    if let Some(message) = receipt.message {
        say(message)?;
    }
    Ok(())
}
