//! Joins stored cart lines against the live catalog.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use libreria_core::{
    CartDocument, Product, ProductId, ResolvedCart, ResolvedCartLine, collections,
};
use tracing::{debug, instrument, warn};

use crate::store::SharedStore;

/// Resolves stored carts into priced carts.
///
/// Resolution never fails. A line is dropped from the result when its
/// product no longer exists, when its product document is malformed, or
/// when the product lookup itself fails. The stored cart is not modified.
pub struct CartReconciler {
    store: SharedStore,
}

impl CartReconciler {
    #[must_use]
    pub const fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Resolve `cart` in stored order. Each distinct product is fetched
    /// once, concurrently with the others.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn resolve(&self, cart: &CartDocument) -> ResolvedCart {
        let mut seen = HashSet::new();
        let unique: Vec<&ProductId> = cart
            .items()
            .iter()
            .map(|line| &line.product_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let products: HashMap<&ProductId, Product> =
            join_all(unique.into_iter().map(|id| async move {
                self.lookup(id).await.map(|product| (id, product))
            }))
            .await
            .into_iter()
            .flatten()
            .collect();

        let mut resolved = ResolvedCart::default();
        let mut missing = 0usize;
        for (index, line) in cart.items().iter().enumerate() {
            let Some(product) = products.get(&line.product_id) else {
                missing += 1;
                continue;
            };
            let priced = ResolvedCartLine::new(index, line, product.clone());
            if !priced.is_some_and(|priced| resolved.push(priced)) {
                warn!(
                    line_id = %line.id,
                    product_id = %line.product_id,
                    "cart line amount overflows, leaving it out"
                );
            }
        }

        if missing > 0 {
            debug!(dropped = missing, "cart lines without a product left out");
        }

        resolved
    }

    async fn lookup(&self, id: &ProductId) -> Option<Product> {
        match self.store.get(collections::PRODUCTS, id.as_str()).await {
            Ok(Some(doc)) => match Product::from_document(id.as_str(), &doc.body) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(product_id = %id, error = %e, "skipping malformed product");
                    None
                }
            },
            Ok(None) => {
                debug!(product_id = %id, "product no longer exists");
                None
            }
            Err(e) => {
                warn!(product_id = %id, error = %e, "product lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use libreria_core::{CartLine, Document, Price, Quantity};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::store::testing::UnavailableStore;
    use crate::store::{DocumentStore, InMemoryStore, Precondition};

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(Decimal::new(price, 0)).unwrap(),
            image_url: String::new(),
            about: String::new(),
            category: "Libros".into(),
        }
    }

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for p in [product("p1", 10), product("p2", 5)] {
            store
                .put(
                    collections::PRODUCTS,
                    p.id.as_str(),
                    p.to_document(),
                    Precondition::Any,
                )
                .await
                .unwrap();
        }
        store
    }

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine::new(ProductId::parse(id).unwrap(), Quantity::new(quantity).unwrap())
    }

    #[tokio::test]
    async fn prices_lines_and_totals() {
        let reconciler = CartReconciler::new(seeded().await);
        let cart = CartDocument::from_lines(vec![line("p1", 2), line("p2", 3)]);

        let resolved = reconciler.resolve(&cart).await;

        assert_eq!(resolved.lines.len(), 2);
        assert_eq!(resolved.lines[0].subtotal, Decimal::new(20, 0));
        assert_eq!(resolved.lines[1].subtotal, Decimal::new(15, 0));
        assert_eq!(resolved.total, Decimal::new(35, 0));
    }

    #[tokio::test]
    async fn drops_lines_for_missing_products() {
        let reconciler = CartReconciler::new(seeded().await);
        let cart =
            CartDocument::from_lines(vec![line("p1", 1), line("gone", 4), line("p2", 1)]);

        let resolved = reconciler.resolve(&cart).await;

        let ids: Vec<_> = resolved
            .lines
            .iter()
            .map(|l| l.product.id.as_str())
            .collect();
        assert_eq!(ids, ["p1", "p2"]);
        assert_eq!(resolved.lines[1].stored_index, 2);
        assert_eq!(resolved.total, Decimal::new(15, 0));
    }

    #[tokio::test]
    async fn repeated_product_yields_one_line_each() {
        let reconciler = CartReconciler::new(seeded().await);
        let cart = CartDocument::from_lines(vec![line("p1", 1), line("p1", 2)]);

        let resolved = reconciler.resolve(&cart).await;

        assert_eq!(resolved.lines.len(), 2);
        assert_eq!(resolved.total, Decimal::new(30, 0));
    }

    #[tokio::test]
    async fn empty_cart_totals_zero() {
        let reconciler = CartReconciler::new(seeded().await);
        let resolved = reconciler.resolve(&CartDocument::new()).await;
        assert!(resolved.is_empty());
        assert_eq!(resolved.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn malformed_product_is_dropped() {
        let store = seeded().await;
        let mut bad = Document::new();
        bad.insert("name".into(), json!("Broken"));
        store
            .put(collections::PRODUCTS, "bad", bad, Precondition::Any)
            .await
            .unwrap();
        let reconciler = CartReconciler::new(store);

        let cart = CartDocument::from_lines(vec![line("bad", 1), line("p2", 1)]);
        let resolved = reconciler.resolve(&cart).await;

        assert_eq!(resolved.lines.len(), 1);
        assert_eq!(resolved.total, Decimal::new(5, 0));
    }

    #[tokio::test]
    async fn overflowing_amounts_are_dropped() {
        let store = seeded().await;
        let mut huge = product("huge", 0).to_document();
        huge.insert("price".into(), json!("50000000000000000000000000000"));
        store
            .put(collections::PRODUCTS, "huge", huge, Precondition::Any)
            .await
            .unwrap();
        let reconciler = CartReconciler::new(store);

        // huge x2 overflows its subtotal; the second huge x1 overflows the total.
        let cart = CartDocument::from_lines(vec![
            line("huge", 2),
            line("p1", 1),
            line("huge", 1),
            line("huge", 1),
        ]);
        let resolved = reconciler.resolve(&cart).await;

        let stored: Vec<_> = resolved.lines.iter().map(|l| l.stored_index).collect();
        assert_eq!(stored, [1, 2]);
        assert_eq!(
            resolved.total,
            Decimal::from_str("50000000000000000000000000010").unwrap()
        );
    }

    #[tokio::test]
    async fn failed_lookups_drop_lines_without_failing() {
        let store = Arc::new(UnavailableStore::for_collection(
            seeded().await,
            collections::PRODUCTS,
        ));
        let reconciler = CartReconciler::new(store);

        let cart = CartDocument::from_lines(vec![line("p1", 1)]);
        let resolved = reconciler.resolve(&cart).await;

        assert!(resolved.is_empty());
    }
}
