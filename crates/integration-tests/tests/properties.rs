//! Randomized checks of cart invariants and filter query encoding.

#![allow(clippy::unwrap_used)]

use fatmac_core::{CategoryId, Condition, Price, Product, ProductId, VendorId};
use fatmac_integration_tests::ProductBuilder;
use fatmac_storefront::cart::{CartStore, KeyValueStore, MemoryStore};
use fatmac_storefront::catalog::{FilterState, ProductFilters, QueryParams, Selection};
use proptest::prelude::*;
use proptest::test_runner::Config;

const KEY: &str = "fatmac_cart";

#[derive(Debug, Clone)]
enum CartOp {
    Add(usize, u32),
    Replace(usize, u32),
    Update(usize, u32),
    Remove(usize),
    Clear,
}

/// Six products from two vendors, with stock drawn per product.
fn catalog() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::vec(prop::option::of(0_i64..6), 6).prop_map(|stocks| {
        stocks
            .into_iter()
            .zip(1_i64..)
            .map(|(stock, id)| {
                let vendor = if id <= 3 { (1, "Tienda Uno") } else { (2, "Tienda Dos") };
                let builder = ProductBuilder::new(id, "Producto", 500 * id).vendor(vendor.0, vendor.1);
                match stock {
                    Some(stock) => builder.stock(stock).build(),
                    None => builder.build(),
                }
            })
            .collect()
    })
}

fn cart_op() -> impl Strategy<Value = CartOp> {
    prop_oneof![
        4 => (0_usize..6, 0_u32..8).prop_map(|(i, q)| CartOp::Add(i, q)),
        1 => (0_usize..6, 0_u32..8).prop_map(|(i, q)| CartOp::Replace(i, q)),
        2 => (0_usize..6, 0_u32..8).prop_map(|(i, q)| CartOp::Update(i, q)),
        1 => (0_usize..6).prop_map(CartOp::Remove),
        1 => Just(CartOp::Clear),
    ]
}

fn apply<S: KeyValueStore>(cart: &mut CartStore<S>, products: &[Product], op: &CartOp) {
    // Rejections are expected; only the resulting state is checked
    match *op {
        CartOp::Add(i, quantity) => {
            let _ = cart.add_item(&products[i], quantity);
        }
        CartOp::Replace(i, quantity) => {
            let _ = cart.replace_with(&products[i], quantity);
        }
        CartOp::Update(i, quantity) => {
            let _ = cart.update_quantity(products[i].id, quantity);
        }
        CartOp::Remove(i) => cart.remove_item(products[i].id),
        CartOp::Clear => cart.clear(),
    }
}

fn assert_consistent<S: KeyValueStore>(cart: &CartStore<S>) -> Result<(), TestCaseError> {
    let items = cart.items();

    // One vendor per cart
    if let Some(first) = items.first() {
        prop_assert!(items.iter().all(|item| item.vendor_id == first.vendor_id));
        prop_assert_eq!(cart.vendor_id(), first.vendor_id);
    }

    // Known stock bounds every line
    for item in items {
        prop_assert!(item.quantity >= 1);
        if let Some(stock) = item.stock {
            prop_assert!(item.quantity <= stock, "{} > {}", item.quantity, stock);
        }
    }

    let mut ids: Vec<ProductId> = items.iter().map(|item| item.id).collect();
    ids.sort();
    ids.dedup();
    prop_assert_eq!(ids.len(), items.len());

    prop_assert_eq!(cart.count(), items.iter().map(|item| item.quantity).sum::<u32>());
    Ok(())
}

fn selection<T: PartialEq + std::fmt::Debug>(
    values: impl Strategy<Value = T>,
) -> impl Strategy<Value = Selection<T>> {
    prop::collection::vec(values, 0..4).prop_map(Selection::from_values)
}

fn filter_state() -> impl Strategy<Value = FilterState> {
    let condition = prop_oneof![Just(Condition::New), Just(Condition::Used)];
    (
        selection((1_i64..10_000).prop_map(CategoryId::new)),
        selection((1_i64..10_000).prop_map(VendorId::new)),
        selection(condition),
        prop::option::of(1_i64..1_000_000),
        any::<bool>(),
        any::<bool>(),
        "[ a-zA-Z0-9ñáé&=+%,?#/]{0,24}",
        1_u32..500,
    )
        .prop_map(
            |(category, vendor, condition, max_cents, is_new, has_discount, search, page)| {
                let filters = ProductFilters {
                    category,
                    vendor,
                    condition,
                    max_price: None,
                    is_new,
                    has_discount,
                }
                .with_max_price(max_cents.map(Price::from_cents));
                FilterState::new(filters, &search, page)
            },
        )
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn test_cart_invariants_hold_after_every_operation(
        products in catalog(),
        ops in prop::collection::vec(cart_op(), 1..40),
    ) {
        let mut cart = CartStore::load(MemoryStore::new(), KEY);
        for op in &ops {
            apply(&mut cart, &products, op);
            assert_consistent(&cart)?;
        }
    }

    #[test]
    fn test_reloaded_cart_matches_persisted_cart(
        products in catalog(),
        ops in prop::collection::vec(cart_op(), 0..30),
    ) {
        let storage = MemoryStore::new();
        let mut cart = CartStore::load(storage.clone(), KEY);
        for op in &ops {
            apply(&mut cart, &products, op);
        }

        let reloaded = CartStore::load(storage, KEY);
        prop_assert_eq!(reloaded.items(), cart.items());
        prop_assert_eq!(reloaded.total(), cart.total());
        prop_assert_eq!(reloaded.vendor_id(), cart.vendor_id());
    }

    #[test]
    fn test_filter_state_survives_query_string(state in filter_state()) {
        let encoded = state.to_query().to_string();
        let decoded = FilterState::from_query(&QueryParams::parse(&encoded));
        prop_assert_eq!(decoded, state);
    }
}
