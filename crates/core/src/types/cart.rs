//! Cart documents and their reconciled, priced view.
//!
//! A [`CartDocument`] is what the store holds for one user: an ordered list of
//! `(product, quantity)` lines. A [`ResolvedCart`] is what a cart looks like
//! after joining those lines against the live catalog. It is derived on every
//! read and never persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineId, Product, ProductId, Quantity};

/// One entry in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a line with a freshly minted id.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: LineId::new(),
            product_id,
            quantity,
        }
    }
}

/// The stored cart of one user. Line order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDocument {
    items: Vec<CartLine>,
}

impl CartDocument {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing lines, keeping their order.
    #[must_use]
    pub const fn from_lines(items: Vec<CartLine>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartLine> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a new line. Adding a product already in the cart creates a
    /// second line; quantities are never merged.
    pub fn push(&mut self, product_id: ProductId, quantity: Quantity) -> LineId {
        let line = CartLine::new(product_id, quantity);
        let id = line.id;
        self.items.push(line);
        id
    }

    /// Remove the line at `index`. Out-of-range indices leave the cart as is.
    pub fn remove_at(&mut self, index: usize) -> Option<CartLine> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove the line with the given id, if present.
    pub fn remove_line(&mut self, id: LineId) -> Option<CartLine> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of the line with the given id. Returns `false` if the
    /// line does not exist.
    pub fn set_quantity(&mut self, id: LineId, quantity: Quantity) -> bool {
        match self.items.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Replace every line.
    pub fn replace(&mut self, items: Vec<CartLine>) {
        self.items = items;
    }

    /// Stored position of the line with the given id.
    #[must_use]
    pub fn position(&self, id: LineId) -> Option<usize> {
        self.items.iter().position(|line| line.id == id)
    }
}

/// A cart line joined against its current product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCartLine {
    pub line_id: LineId,
    /// Position of the line in the stored document.
    pub stored_index: usize,
    pub product: Product,
    pub quantity: Quantity,
    pub subtotal: Decimal,
}

impl ResolvedCartLine {
    /// Price `product` for the given stored line. Returns `None` when the
    /// subtotal overflows.
    #[must_use]
    pub fn new(stored_index: usize, line: &CartLine, product: Product) -> Option<Self> {
        let subtotal = product.price.times(line.quantity)?;
        Some(Self {
            line_id: line.id,
            stored_index,
            product,
            quantity: line.quantity,
            subtotal,
        })
    }
}

/// A priced cart, in stored line order, with dangling lines left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedCart {
    pub lines: Vec<ResolvedCartLine>,
    pub total: Decimal,
}

impl ResolvedCart {
    /// Build a resolved cart; the total is the sum of line subtotals.
    /// Lines that would overflow the total are left out (see [`Self::push`]).
    #[must_use]
    pub fn from_lines(lines: Vec<ResolvedCartLine>) -> Self {
        let mut cart = Self::default();
        for line in lines {
            cart.push(line);
        }
        cart
    }

    /// Append a line and add its subtotal to the total. Returns `false`, and
    /// leaves the cart unchanged, if the total would overflow.
    pub fn push(&mut self, line: ResolvedCartLine) -> bool {
        match self.total.checked_add(line.subtotal) {
            Some(total) => {
                self.total = total;
                self.lines.push(line);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Map a position in this (filtered) list back to the stored document.
    #[must_use]
    pub fn stored_index(&self, resolved_index: usize) -> Option<usize> {
        self.lines.get(resolved_index).map(|line| line.stored_index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;
    use crate::types::Price;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(Decimal::from_str(price).unwrap()).unwrap(),
            image_url: String::new(),
            about: String::new(),
            category: "Libreria".to_string(),
        }
    }

    fn cart_of(products: &[(&str, u32)]) -> CartDocument {
        let mut cart = CartDocument::new();
        for (id, quantity) in products {
            cart.push(
                ProductId::parse(*id).unwrap(),
                Quantity::new(*quantity).unwrap(),
            );
        }
        cart
    }

    #[test]
    fn test_push_appends_without_merging() {
        let mut cart = cart_of(&[("p1", 2)]);
        cart.push(ProductId::parse("p1").unwrap(), Quantity::ONE);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity.get(), 2);
        assert_eq!(cart.items()[1].quantity.get(), 1);
        assert_ne!(cart.items()[0].id, cart.items()[1].id);
    }

    #[test]
    fn test_remove_line_by_id() {
        let mut cart = cart_of(&[("p1", 1), ("p2", 2), ("p3", 3)]);
        let middle = cart.items()[1].id;

        let removed = cart.remove_line(middle).unwrap();
        assert_eq!(removed.product_id.as_str(), "p2");
        assert_eq!(cart.len(), 2);
        assert!(cart.remove_line(middle).is_none());
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = cart_of(&[("p1", 1)]);
        let id = cart.items()[0].id;

        assert!(cart.set_quantity(id, Quantity::new(4).unwrap()));
        assert_eq!(cart.items()[0].quantity.get(), 4);
        assert!(!cart.set_quantity(LineId::new(), Quantity::ONE));
    }

    #[test]
    fn test_resolved_scenario_totals() {
        let cart = cart_of(&[("p1", 2), ("p2", 3)]);
        let lines = vec![
            ResolvedCartLine::new(0, &cart.items()[0], product("p1", "10")).unwrap(),
            ResolvedCartLine::new(1, &cart.items()[1], product("p2", "5")).unwrap(),
        ];
        let resolved = ResolvedCart::from_lines(lines);

        assert_eq!(resolved.lines[0].subtotal, Decimal::from(20));
        assert_eq!(resolved.lines[1].subtotal, Decimal::from(15));
        assert_eq!(resolved.total, Decimal::from(35));
        assert_eq!(resolved.item_count(), 5);
    }

    #[test]
    fn test_empty_resolved_cart_totals_zero() {
        let resolved = ResolvedCart::from_lines(Vec::new());
        assert!(resolved.is_empty());
        assert_eq!(resolved.total, Decimal::ZERO);
    }

    #[test]
    fn test_stored_index_skips_filtered_lines() {
        let cart = cart_of(&[("p1", 1), ("gone", 1), ("p3", 1)]);
        let resolved = ResolvedCart::from_lines(vec![
            ResolvedCartLine::new(0, &cart.items()[0], product("p1", "1")).unwrap(),
            ResolvedCartLine::new(2, &cart.items()[2], product("p3", "1")).unwrap(),
        ]);

        assert_eq!(resolved.stored_index(0), Some(0));
        assert_eq!(resolved.stored_index(1), Some(2));
        assert_eq!(resolved.stored_index(2), None);
    }

    #[test]
    fn test_line_subtotal_overflow_is_rejected() {
        let cart = cart_of(&[("big", 2)]);
        let big = product("big", "50000000000000000000000000000");
        assert!(ResolvedCartLine::new(0, &cart.items()[0], big).is_none());
    }

    #[test]
    fn test_push_refuses_line_that_overflows_total() {
        let cart = cart_of(&[("big", 1), ("big", 1), ("p1", 1)]);
        let big = product("big", "50000000000000000000000000000");
        let mut resolved = ResolvedCart::default();

        assert!(resolved.push(ResolvedCartLine::new(0, &cart.items()[0], big.clone()).unwrap()));
        assert!(!resolved.push(ResolvedCartLine::new(1, &cart.items()[1], big).unwrap()));
        assert!(resolved.push(
            ResolvedCartLine::new(2, &cart.items()[2], product("p1", "1")).unwrap()
        ));

        assert_eq!(resolved.lines.len(), 2);
        assert_eq!(resolved.stored_index(1), Some(2));
        assert_eq!(
            resolved.total,
            Decimal::from_str("50000000000000000000000000001").unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_push_appends_and_keeps_prior_lines(
            quantities in proptest::collection::vec(1u32..=20, 0..12),
            added in 1u32..=20,
        ) {
            let mut cart = CartDocument::new();
            for (i, q) in quantities.iter().enumerate() {
                cart.push(ProductId::parse(format!("p{i}")).unwrap(), Quantity::new(*q).unwrap());
            }
            let before = cart.clone();

            let id = cart.push(ProductId::parse("new").unwrap(), Quantity::new(added).unwrap());

            prop_assert_eq!(cart.len(), before.len() + 1);
            prop_assert_eq!(&cart.items()[..before.len()], before.items());
            let last = cart.items().last().unwrap();
            prop_assert_eq!(last.id, id);
            prop_assert_eq!(last.product_id.as_str(), "new");
            prop_assert_eq!(last.quantity.get(), added);
        }

        #[test]
        fn prop_remove_at_drops_exactly_one_line(
            len in 0usize..12,
            index in 0usize..16,
        ) {
            let mut cart = CartDocument::new();
            for i in 0..len {
                cart.push(ProductId::parse(format!("p{i}")).unwrap(), Quantity::ONE);
            }
            let before = cart.clone();

            let removed = cart.remove_at(index);

            if index < len {
                let mut expected = before.clone().into_items();
                let expected_removed = expected.remove(index);
                prop_assert_eq!(removed, Some(expected_removed));
                prop_assert_eq!(cart.items(), expected.as_slice());
            } else {
                prop_assert!(removed.is_none());
                prop_assert_eq!(cart, before);
            }
        }

        #[test]
        fn prop_extreme_amounts_never_overflow(
            lines in proptest::collection::vec(
                (any::<u32>(), any::<u32>(), any::<u32>(), 0u32..=28, 1u32..=u32::MAX),
                0..8,
            ),
        ) {
            let mut cart = CartDocument::new();
            let mut priced = Vec::new();
            for (i, (lo, mid, hi, scale, quantity)) in lines.iter().enumerate() {
                cart.push(ProductId::parse(format!("p{i}")).unwrap(), Quantity::new(*quantity).unwrap());
                let mut p = product(&format!("p{i}"), "0");
                p.price = Price::new(Decimal::from_parts(*lo, *mid, *hi, false, *scale)).unwrap();
                priced.push(p);
            }

            let resolved = ResolvedCart::from_lines(
                cart.items()
                    .iter()
                    .zip(priced)
                    .enumerate()
                    .filter_map(|(i, (line, p))| ResolvedCartLine::new(i, line, p))
                    .collect(),
            );

            let mut expected = Decimal::ZERO;
            for line in &resolved.lines {
                let subtotal = line.product.price.amount().checked_mul(Decimal::from(line.quantity.get()));
                prop_assert_eq!(subtotal, Some(line.subtotal));
                expected = expected.checked_add(line.subtotal).unwrap();
            }
            prop_assert_eq!(resolved.total, expected);
            prop_assert!(resolved.lines.windows(2).all(|w| w[0].stored_index < w[1].stored_index));
        }

        #[test]
        fn prop_total_is_sum_of_subtotals(
            lines in proptest::collection::vec((0u32..100_000, 1u32..=50), 0..10),
        ) {
            let mut cart = CartDocument::new();
            let mut products = Vec::new();
            for (i, (cents, quantity)) in lines.iter().enumerate() {
                cart.push(ProductId::parse(format!("p{i}")).unwrap(), Quantity::new(*quantity).unwrap());
                let mut p = product(&format!("p{i}"), "0");
                p.price = Price::new(Decimal::new(i64::from(*cents), 2)).unwrap();
                products.push(p);
            }
            let resolved = ResolvedCart::from_lines(
                cart.items()
                    .iter()
                    .zip(products)
                    .enumerate()
                    .map(|(i, (line, p))| ResolvedCartLine::new(i, line, p).unwrap())
                    .collect(),
            );

            let expected: Decimal = lines
                .iter()
                .map(|(cents, q)| Decimal::new(i64::from(*cents), 2) * Decimal::from(*q))
                .sum();
            prop_assert_eq!(resolved.total, expected);
        }
    }
}
