//! Cart repository, reconciler and checkout composer working together.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use libreria_core::{CartDocument, CartLine, Quantity, collections};
use libreria_integration_tests::{cart_service, delete_product, product_id, seeded_store, user};
use libreria_storefront::services::cart::{CartError, WriteMode};
use libreria_storefront::services::checkout::compose;
use libreria_storefront::store::{DocumentStore, Precondition, SharedStore};
use rstest::rstest;
use rust_decimal::Decimal;

// =============================================================================
// Repository Ordering Tests
// =============================================================================

#[tokio::test]
async fn test_added_lines_keep_insertion_order() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());
    let alice = user("alice");

    for (id, qty) in [("p1", 1), ("p2", 2), ("p1", 3)] {
        cart.repository()
            .add_line(Some(&alice), product_id(id), qty)
            .await
            .unwrap();
    }

    let stored = cart.repository().load(Some(&alice)).await.unwrap();
    let lines: Vec<_> = stored
        .items()
        .iter()
        .map(|line| (line.product_id.as_str().to_string(), line.quantity.get()))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("p1".to_string(), 1),
            ("p2".to_string(), 2),
            ("p1".to_string(), 3)
        ]
    );
}

#[rstest]
#[case::first(0, &["p2", "p3"])]
#[case::middle(1, &["p1", "p3"])]
#[case::last(2, &["p1", "p2"])]
#[case::out_of_range(3, &["p1", "p2", "p3"])]
#[case::far_out_of_range(99, &["p1", "p2", "p3"])]
#[tokio::test]
async fn test_remove_line_at(#[case] index: usize, #[case] expected: &[&str]) {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());
    let alice = user("alice");

    for id in ["p1", "p2", "p3"] {
        cart.repository()
            .add_line(Some(&alice), product_id(id), 1)
            .await
            .unwrap();
    }

    cart.repository()
        .remove_line_at(Some(&alice), index)
        .await
        .unwrap();

    let stored = cart.repository().load(Some(&alice)).await.unwrap();
    let remaining: Vec<_> = stored
        .items()
        .iter()
        .map(|line| line.product_id.as_str())
        .collect();
    assert_eq!(remaining, expected);
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());

    cart.repository()
        .add_line(Some(&user("alice")), product_id("p1"), 1)
        .await
        .unwrap();

    let bob = cart.repository().load(Some(&user("bob"))).await.unwrap();
    assert!(bob.is_empty());
}

#[tokio::test]
async fn test_no_user_never_touches_the_store() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store.clone(), WriteMode::default());

    let result = cart.repository().add_line(None, product_id("p1"), 1).await;
    assert!(matches!(result, Err(CartError::Unauthenticated)));
    assert!(store.list(collections::CARTS).await.unwrap().is_empty());
}

// =============================================================================
// Reconciliation Tests
// =============================================================================

#[tokio::test]
async fn test_resolved_total_and_checkout_message() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());
    let alice = user("alice");

    cart.repository()
        .add_line(Some(&alice), product_id("p1"), 2)
        .await
        .unwrap();
    cart.repository()
        .add_line(Some(&alice), product_id("p2"), 3)
        .await
        .unwrap();

    let resolved = cart.view(Some(&alice)).await.unwrap();
    assert_eq!(resolved.lines.len(), 2);
    assert_eq!(resolved.total, Decimal::new(35, 0));

    let message = compose(&resolved.lines, resolved.total);
    assert!(message.contains("Rayuela - qty:2 - subtotal:20"));
    assert!(message.contains("Gente - qty:3 - subtotal:15"));
    assert!(message.ends_with("total:35"));
}

#[tokio::test]
async fn test_vanished_product_is_left_out_but_kept_in_storage() {
    let store = seeded_store().await;
    let shared: SharedStore = store.clone();
    let cart = cart_service(shared, WriteMode::default());
    let alice = user("alice");

    for (id, qty) in [("p1", 2), ("pX", 1), ("p2", 3)] {
        cart.repository()
            .add_line(Some(&alice), product_id(id), qty)
            .await
            .unwrap();
    }
    delete_product(store.as_ref(), "p2").await;

    let resolved = cart.view(Some(&alice)).await.unwrap();
    assert_eq!(resolved.lines.len(), 1);
    assert_eq!(resolved.total, Decimal::new(20, 0));

    let stored = cart.repository().load(Some(&alice)).await.unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_resolve_is_repeatable() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());
    let document = CartDocument::from_lines(vec![
        CartLine::new(product_id("p2"), Quantity::new(1).unwrap()),
        CartLine::new(product_id("missing"), Quantity::new(4).unwrap()),
        CartLine::new(product_id("p1"), Quantity::new(2).unwrap()),
    ]);

    let first = cart.reconciler().resolve(&document).await;
    let second = cart.reconciler().resolve(&document).await;
    assert_eq!(first, second);
    assert_eq!(first.total, Decimal::new(25, 0));
}

#[tokio::test]
async fn test_removing_by_resolved_position_targets_the_stored_line() {
    let store: SharedStore = seeded_store().await;
    let cart = cart_service(store, WriteMode::default());
    let alice = user("alice");

    for id in ["gone", "p1", "p2"] {
        cart.repository()
            .add_line(Some(&alice), product_id(id), 1)
            .await
            .unwrap();
    }

    // The second visible line is p2, stored third.
    let resolved = cart.view(Some(&alice)).await.unwrap();
    assert_eq!(resolved.lines[1].product.name, "Gente");
    let stored_index = resolved.stored_index(1).unwrap();
    assert_eq!(stored_index, 2);

    cart.repository()
        .remove_line_at(Some(&alice), stored_index)
        .await
        .unwrap();

    let resolved = cart.view(Some(&alice)).await.unwrap();
    let names: Vec<_> = resolved
        .lines
        .iter()
        .map(|line| line.product.name.as_str())
        .collect();
    assert_eq!(names, vec!["Rayuela"]);
}

#[tokio::test]
async fn test_legacy_cart_document_is_readable() {
    let store = seeded_store().await;
    store
        .put(
            collections::CARTS,
            "legacy",
            serde_json::from_str(r#"{"items": [{"productId": "p1", "quantity": 2}]}"#).unwrap(),
            Precondition::Any,
        )
        .await
        .unwrap();

    let cart = cart_service(store, WriteMode::default());
    let legacy = user("legacy");
    let resolved = cart.view(Some(&legacy)).await.unwrap();
    assert_eq!(resolved.total, Decimal::new(20, 0));

    // Ids assigned on read are stable, so they can address the line.
    let line_id = resolved.lines[0].line_id;
    assert!(
        cart.repository()
            .update_quantity(Some(&legacy), line_id, 1)
            .await
            .unwrap()
    );
    let resolved = cart.view(Some(&legacy)).await.unwrap();
    assert_eq!(resolved.total, Decimal::new(10, 0));
}

#[tokio::test]
async fn test_store_is_shared_between_services() {
    let store = seeded_store().await;
    let first = cart_service(store.clone(), WriteMode::default());
    let second = cart_service(Arc::clone(&store) as SharedStore, WriteMode::LastWriteWins);
    let alice = user("alice");

    first
        .repository()
        .add_line(Some(&alice), product_id("p1"), 1)
        .await
        .unwrap();
    let seen = second.view(Some(&alice)).await.unwrap();
    assert_eq!(seen.item_count(), 1);
}
