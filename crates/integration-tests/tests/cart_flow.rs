//! Cart scenarios across the public storefront API.

#![allow(clippy::unwrap_used)]

use fatmac_core::{Price, ProductId, VendorId};
use fatmac_integration_tests::ProductBuilder;
use fatmac_storefront::cart::{CartError, CartEvent, CartStore, FileStore, KeyValueStore};

const KEY: &str = "fatmac_cart";

fn p1() -> fatmac_core::Product {
    ProductBuilder::new(1, "Polo azul", 2000)
        .stock(5)
        .vendor(1, "Tienda Uno")
        .build()
}

fn p2() -> fatmac_core::Product {
    ProductBuilder::new(2, "Gorra", 1500)
        .stock(3)
        .vendor(2, "Tienda Dos")
        .build()
}

#[test]
fn test_shopping_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartStore::load(FileStore::new(dir.path()), KEY);

    cart.add_item(&p1(), 1).unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.total(), Price::from_cents(2000));

    cart.add_item(&p1(), 1).unwrap();
    assert_eq!(cart.item(ProductId::new(1)).unwrap().quantity, 2);
    assert_eq!(cart.total(), Price::from_cents(4000));

    let err = cart.add_item(&p2(), 1).unwrap_err();
    assert_eq!(
        err,
        CartError::VendorConflict {
            cart_vendor: Some(VendorId::new(1)),
            incoming_vendor: Some(VendorId::new(2)),
        }
    );
    assert_eq!(cart.count(), 2);

    let err = cart.update_quantity(ProductId::new(1), 10).unwrap_err();
    assert!(matches!(err, CartError::InsufficientStock { available: 5, .. }));
    assert_eq!(cart.item(ProductId::new(1)).unwrap().quantity, 2);

    // Confirming the conflict leaves only the new product
    cart.replace_with(&p2(), 1).unwrap();
    assert_eq!(cart.vendor_id(), Some(VendorId::new(2)));
    assert_eq!(cart.count(), 1);
    assert_eq!(cart.total(), Price::from_cents(1500));
}

#[test]
fn test_cart_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = CartStore::load(FileStore::new(dir.path()), KEY);
    cart.add_item(&p1(), 3).unwrap();
    let before = cart.items().to_vec();
    drop(cart);

    let reloaded = CartStore::load(FileStore::new(dir.path()), KEY);
    assert_eq!(reloaded.items(), before.as_slice());
    assert_eq!(reloaded.total(), Price::from_cents(6000));
    assert!(!reloaded.is_open());
}

#[test]
fn test_corrupt_file_loads_empty_cart() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set(KEY, r#"{"not":"a cart"}"#).unwrap();

    let mut cart = CartStore::load(store, KEY);
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Price::from_cents(0));

    // The next mutation overwrites the bad data
    cart.add_item(&p2(), 1).unwrap();
    let saved = FileStore::new(dir.path()).get(KEY).unwrap().unwrap();
    assert!(saved.starts_with('['));
}

#[test]
fn test_total_is_stable_without_mutation() {
    let mut cart = CartStore::load(fatmac_storefront::cart::MemoryStore::new(), KEY);
    assert_eq!(cart.total(), Price::from_cents(0));

    cart.add_item(&p1(), 2).unwrap();
    assert_eq!(cart.total(), cart.total());
}

#[test]
fn test_subscribers_see_additions() {
    let mut cart = CartStore::load(fatmac_storefront::cart::MemoryStore::new(), KEY);
    let mut events = cart.subscribe();

    cart.add_item(&p1(), 1).unwrap();

    let mut added = None;
    let mut last_summary = None;
    while let Ok(event) = events.try_recv() {
        match event {
            CartEvent::ItemAdded { product_id, .. } => added = Some(product_id),
            CartEvent::Changed(summary) => last_summary = Some(summary),
        }
    }
    assert_eq!(added, Some(ProductId::new(1)));
    let summary = last_summary.unwrap();
    assert_eq!(summary.count, 1);
    assert!(summary.is_open);
}

#[test]
fn test_stock_bound_holds_after_every_operation() {
    let mut cart = CartStore::load(fatmac_storefront::cart::MemoryStore::new(), KEY);
    let product = p1();

    for quantity in [1, 2, 3, 4] {
        let _ = cart.add_item(&product, quantity);
        let _ = cart.update_quantity(product.id, quantity * 2);
        for item in cart.items() {
            assert!(item.stock.is_none_or(|stock| item.quantity <= stock));
        }
    }
}
