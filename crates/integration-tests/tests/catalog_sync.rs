//! Catalog filter/query synchronization against a slow listing service.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use fatmac_core::{CategoryId, Price};
use fatmac_integration_tests::{FakeListingService, ProductBuilder};
use fatmac_storefront::catalog::{
    AddressBar, CatalogSession, ListingView, MemoryAddressBar, ProductFilters, RecordingViewport, Selection,
};

type Session = CatalogSession<FakeListingService, MemoryAddressBar, RecordingViewport>;

fn catalog() -> Vec<fatmac_core::Product> {
    (1..=30)
        .map(|id| {
            let name = if id % 2 == 0 { "Taza" } else { "Polo" };
            ProductBuilder::new(id, &format!("{name} {id}"), 1000 + id)
                .category(if id <= 20 { 3 } else { 4 })
                .build()
        })
        .collect()
}

fn open(query: &str, service: FakeListingService) -> (Session, Arc<FakeListingService>) {
    let service = Arc::new(service);
    let session = CatalogSession::with_debounce(
        Arc::clone(&service),
        MemoryAddressBar::at(query),
        RecordingViewport::default(),
        Duration::from_millis(500),
    );
    (session, service)
}

#[tokio::test(start_paused = true)]
async fn test_query_string_decodes_into_first_request() {
    let (mut session, service) = open(
        "?category_id=1,2&max_price=100&page=2",
        FakeListingService::new(catalog()),
    );
    session.run_until_idle().await;

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    let state = calls.first().unwrap();
    assert_eq!(
        state.filters.category,
        Selection::Many(vec![CategoryId::new(1), CategoryId::new(2)])
    );
    assert_eq!(state.filters.max_price, Some(Price::from_cents(10000)));
    assert_eq!(state.page, 2);
    // Loading from the address bar never writes back to it
    assert_eq!(session.address().write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_filter_change_resets_page() {
    let (mut session, _service) = open("", FakeListingService::new(catalog()).with_per_page(5));
    session.run_until_idle().await;

    session.set_filters(ProductFilters::default().with_category(CategoryId::new(3)));
    session.set_page(2);
    let filters = session
        .state()
        .filters
        .clone()
        .with_max_price(Some(Price::from_cents(10000)));
    session.set_filters(filters);
    session.run_until_idle().await;

    let state = session.state();
    assert_eq!(state.page, 1);
    assert_eq!(state.filters.category, Selection::One(CategoryId::new(3)));
    assert_eq!(state.filters.max_price, Some(Price::from_cents(10000)));
    assert_eq!(
        session.address().read().to_string(),
        "category_id=3&max_price=100"
    );
    assert_eq!(session.view().page().unwrap().meta.current_page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_response_is_discarded() {
    let service = FakeListingService::new(catalog())
        .with_per_page(5)
        .with_delays([Duration::from_millis(900), Duration::from_millis(100)]);
    let (mut session, service) = open("", service);

    // A: initial load (slow), B: page 2 (fast)
    session.set_page(2);
    assert_eq!(session.in_flight(), 2);

    // B arrives first
    assert!(session.tick().await);
    assert_eq!(session.view().page().unwrap().meta.current_page, 2);

    // A arrives later and is dropped
    assert!(session.tick().await);
    assert_eq!(session.view().page().unwrap().meta.current_page, 2);
    assert!(!session.tick().await);
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_typing_settles_into_one_write() {
    let (mut session, service) = open("?category_id=3", FakeListingService::new(catalog()));
    session.run_until_idle().await;

    for text in ["t", "ta", "taz", "taza "] {
        session.set_search(text);
        tokio::time::advance(Duration::from_millis(300)).await;
    }
    assert_eq!(session.address().write_count(), 0);
    assert_eq!(session.search_input(), "taza ");

    session.run_until_idle().await;
    assert_eq!(session.address().write_count(), 1);
    assert_eq!(
        session.address().read().to_string(),
        "category_id=3&search=taza"
    );

    let page = session.view().page().unwrap();
    assert_eq!(page.meta.total, 10);
    assert!(page.items.iter().all(|p| p.name.starts_with("Taza")));
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_listing_can_be_retried() {
    let service = FakeListingService::new(catalog());
    service.fail_next();
    let (mut session, service) = open("", service);

    session.run_until_idle().await;
    assert!(matches!(session.view(), ListingView::Failed { .. }));

    session.retry();
    session.run_until_idle().await;
    assert_eq!(session.view().page().unwrap().meta.total, 30);
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_history_navigation_round_trip() {
    let (mut session, _service) = open("?category_id=4", FakeListingService::new(catalog()));
    session.run_until_idle().await;
    assert_eq!(session.view().page().unwrap().meta.total, 10);

    let next = session
        .address_mut()
        .navigate(fatmac_storefront::catalog::QueryParams::parse("category_id=3&page=2"));
    session.navigated(next);
    session.run_until_idle().await;
    assert_eq!(session.state().page, 2);
    assert_eq!(session.state().filters.category, Selection::One(CategoryId::new(3)));

    let back = session.address_mut().back().unwrap();
    session.navigated(back);
    session.run_until_idle().await;
    assert_eq!(session.state().page, 1);
    assert_eq!(session.state().filters.category, Selection::One(CategoryId::new(4)));
    assert_eq!(session.address().write_count(), 0);
}
