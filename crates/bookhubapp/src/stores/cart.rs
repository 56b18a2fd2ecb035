//! The active shopping basket.
//!
//! The cart is process-wide rather than per user and is only emptied
//! explicitly, normally right after checkout creates an order. Each book
//! appears at most once, and a line never holds a quantity of zero.

use crate::error::{BookhubError, Result};
use crate::model::{checked_total, Book, CartItem};
use crate::store::{load_json, save_json, StorageBackend, CART_KEY};
use rust_decimal::Decimal;
use tracing::{debug, warn};

pub struct CartStore<B: StorageBackend> {
    backend: B,
    items: Vec<CartItem>,
}

impl<B: StorageBackend> CartStore<B> {
    pub fn load(backend: B) -> Result<Self> {
        let items = load_json(&backend, CART_KEY)?.unwrap_or_default();
        Ok(Self { backend, items })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_item(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Add `quantity` copies of `book`, merging with an existing line.
    pub fn add_to_cart(&mut self, book: &Book, quantity: u32) -> Result<()> {
        if quantity == 0 {
            debug!(book_id = %book.id, "ignoring add of zero copies");
            return Ok(());
        }
        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.id() == book.id) {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    BookhubError::Validation(format!("quantity overflow for {}", book.id))
                })?;
            }
            None => items.push(CartItem {
                book: book.clone(),
                quantity,
            }),
        }
        self.commit(items)
    }

    /// Set the quantity of a line. Zero or less removes it.
    pub fn update_quantity(&mut self, item_id: &str, new_quantity: i64) -> Result<()> {
        if new_quantity <= 0 {
            return self.remove_from_cart(item_id);
        }
        let quantity = u32::try_from(new_quantity).map_err(|_| {
            BookhubError::Validation(format!("quantity too large: {new_quantity}"))
        })?;

        let Some(pos) = self.items.iter().position(|item| item.id() == item_id) else {
            debug!(item_id, "quantity change for item not in cart ignored");
            return Ok(());
        };
        let mut items = self.items.clone();
        items[pos].quantity = quantity;
        self.commit(items)
    }

    pub fn remove_from_cart(&mut self, item_id: &str) -> Result<()> {
        if self.get_item(item_id).is_none() {
            return Ok(());
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != item_id)
            .cloned()
            .collect();
        self.commit(items)
    }

    pub fn clear_cart(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    /// Sum of price × quantity, computed on every call. Fails only for a
    /// cart persisted by something other than this store.
    pub fn get_total(&self) -> Result<Decimal> {
        checked_total(&self.items).ok_or_else(total_too_large)
    }

    /// Sum of quantities, not the number of distinct books.
    pub fn get_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// A cart whose total cannot be computed is never written.
    fn commit(&mut self, items: Vec<CartItem>) -> Result<()> {
        if checked_total(&items).is_none() {
            warn!("rejecting cart change: total does not fit");
            return Err(total_too_large());
        }
        save_json(&self.backend, CART_KEY, &items)?;
        self.items = items;
        Ok(())
    }
}

fn total_too_large() -> BookhubError {
    BookhubError::Validation("cart total is too large".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookInput;
    use crate::store::mem_backend::MemBackend;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn book(id: &str, price: i64) -> Book {
        BookInput {
            title: format!("Book {id}"),
            author: "Author".into(),
            category: "Fiction".into(),
            price: Decimal::from(price),
            ..Default::default()
        }
        .into_book(id.into(), Utc::now())
        .unwrap()
    }

    fn cart() -> CartStore<Rc<MemBackend>> {
        CartStore::load(Rc::new(MemBackend::new())).unwrap()
    }

    fn assert_consistent(cart: &CartStore<Rc<MemBackend>>) {
        let count: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
        let total: Decimal = cart
            .items()
            .iter()
            .map(|i| i.book.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.get_item_count(), count);
        assert_eq!(cart.get_total().unwrap(), total);
        assert!(cart.items().iter().all(|i| i.quantity >= 1));
        let mut ids: Vec<&str> = cart.items().iter().map(CartItem::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cart.items().len());
    }

    #[test]
    fn adding_same_book_merges_lines() {
        let mut cart = cart();
        let a = book("a", 100);
        cart.add_to_cart(&a, 1).unwrap();
        cart.add_to_cart(&a, 2).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get_item("a").unwrap().quantity, 3);
        assert_consistent(&cart);
    }

    #[test]
    fn total_and_count_follow_every_mutation() {
        let mut cart = cart();
        let a = book("a", 100);
        let b = book("b", 50);
        let c = book("c", 7);

        cart.add_to_cart(&a, 2).unwrap();
        assert_consistent(&cart);
        cart.add_to_cart(&b, 1).unwrap();
        assert_eq!(cart.get_total().unwrap(), Decimal::from(250));
        assert_eq!(cart.get_item_count(), 3);
        cart.add_to_cart(&c, 4).unwrap();
        assert_consistent(&cart);
        cart.update_quantity("a", 5).unwrap();
        assert_consistent(&cart);
        cart.remove_from_cart("b").unwrap();
        assert_consistent(&cart);
        cart.update_quantity("c", -3).unwrap();
        assert_consistent(&cart);
        assert_eq!(cart.get_total().unwrap(), Decimal::from(500));
        assert_eq!(cart.get_item_count(), 5);
    }

    #[test]
    fn zero_quantity_equals_remove() {
        let mut left = cart();
        let mut right = cart();
        for cart in [&mut left, &mut right] {
            cart.add_to_cart(&book("a", 10), 2).unwrap();
            cart.add_to_cart(&book("b", 20), 1).unwrap();
        }
        left.update_quantity("a", 0).unwrap();
        right.remove_from_cart("a").unwrap();
        assert_eq!(left.items(), right.items());
        assert!(left.get_item("a").is_none());
    }

    #[test]
    fn unknown_items_are_ignored() {
        let mut cart = cart();
        cart.add_to_cart(&book("a", 10), 1).unwrap();
        cart.update_quantity("missing", 4).unwrap();
        cart.remove_from_cart("missing").unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn adding_zero_copies_is_a_noop() {
        let mut cart = cart();
        cart.add_to_cart(&book("a", 10), 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_and_persists() {
        let backend = Rc::new(MemBackend::new());
        let mut cart = CartStore::load(Rc::clone(&backend)).unwrap();
        cart.add_to_cart(&book("a", 10), 1).unwrap();
        cart.clear_cart().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.get_total().unwrap(), Decimal::ZERO);

        let reloaded = CartStore::load(backend).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn cart_is_rehydrated() {
        let backend = Rc::new(MemBackend::new());
        let mut cart = CartStore::load(Rc::clone(&backend)).unwrap();
        cart.add_to_cart(&book("a", 100), 2).unwrap();
        cart.add_to_cart(&book("b", 50), 1).unwrap();

        let reloaded = CartStore::load(backend).unwrap();
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.get_total().unwrap(), cart.get_total().unwrap());
    }

    #[test]
    fn failed_write_keeps_cart() {
        let backend = Rc::new(MemBackend::new());
        let mut cart = CartStore::load(Rc::clone(&backend)).unwrap();
        cart.add_to_cart(&book("a", 10), 1).unwrap();
        backend.set_simulate_write_error(true);
        assert!(cart.add_to_cart(&book("a", 10), 1).is_err());
        assert!(cart.clear_cart().is_err());
        assert_eq!(cart.get_item_count(), 1);
    }

    #[test]
    fn item_count_does_not_wrap() {
        let mut cart = cart();
        cart.add_to_cart(&book("a", 1), 3_000_000_000).unwrap();
        cart.add_to_cart(&book("b", 1), 3_000_000_000).unwrap();
        assert_eq!(cart.get_item_count(), 6_000_000_000);
        assert_consistent(&cart);
    }

    #[test]
    fn unrepresentable_total_is_rejected() {
        let mut cart = cart();
        let mut pricey = book("a", 0);
        pricey.price = Decimal::MAX;
        cart.add_to_cart(&pricey, 1).unwrap();

        let err = cart.add_to_cart(&pricey, 1).unwrap_err();
        assert!(matches!(err, BookhubError::Validation(_)));
        let err = cart.add_to_cart(&book("b", 1), 1).unwrap_err();
        assert!(matches!(err, BookhubError::Validation(_)));
        assert_eq!(cart.get_item_count(), 1);
        assert_eq!(cart.get_total().unwrap(), Decimal::MAX);
    }

    #[test]
    fn overflowing_persisted_cart_reports_an_error() {
        let backend = Rc::new(MemBackend::new());
        let mut pricey = book("a", 0);
        pricey.price = Decimal::MAX;
        let items = vec![CartItem {
            book: pricey,
            quantity: 2,
        }];
        save_json(&*backend, CART_KEY, &items).unwrap();

        let cart = CartStore::load(backend).unwrap();
        assert!(matches!(cart.get_total(), Err(BookhubError::Validation(_))));
    }

    #[derive(Debug, Clone)]
    enum CartOp {
        Add(usize, u32),
        Set(usize, i64),
        Remove(usize),
        Clear,
    }

    const SHELF: [(&str, i64); 4] = [("a", 100), ("b", 50), ("c", 7), ("d", 1)];

    fn cart_op() -> impl Strategy<Value = CartOp> {
        let slot = 0..SHELF.len();
        prop_oneof![
            4 => (slot.clone(), 0..5u32).prop_map(|(i, q)| CartOp::Add(i, q)),
            3 => (slot.clone(), -3..6i64).prop_map(|(i, q)| CartOp::Set(i, q)),
            2 => slot.prop_map(CartOp::Remove),
            1 => Just(CartOp::Clear),
        ]
    }

    fn apply(cart: &mut CartStore<Rc<MemBackend>>, shelf: &[Book], op: &CartOp) {
        match *op {
            CartOp::Add(i, q) => cart.add_to_cart(&shelf[i], q).unwrap(),
            CartOp::Set(i, q) => cart.update_quantity(&shelf[i].id, q).unwrap(),
            CartOp::Remove(i) => cart.remove_from_cart(&shelf[i].id).unwrap(),
            CartOp::Clear => cart.clear_cart().unwrap(),
        }
    }

    fn shelf() -> Vec<Book> {
        SHELF.iter().map(|(id, price)| book(id, *price)).collect()
    }

    proptest! {
        #[test]
        fn invariants_hold_after_any_sequence(ops in prop::collection::vec(cart_op(), 0..40)) {
            let shelf = shelf();
            let mut cart = cart();
            for op in &ops {
                apply(&mut cart, &shelf, op);
                assert_consistent(&cart);
            }

            let reloaded = CartStore::load(Rc::clone(&cart.backend)).unwrap();
            prop_assert_eq!(reloaded.items(), cart.items());
        }

        #[test]
        fn setting_zero_matches_removal(
            ops in prop::collection::vec(cart_op(), 0..20),
            target in 0..SHELF.len(),
            quantity in -3..=0i64,
        ) {
            let shelf = shelf();
            let mut left = cart();
            let mut right = cart();
            for op in &ops {
                apply(&mut left, &shelf, op);
                apply(&mut right, &shelf, op);
            }
            left.update_quantity(&shelf[target].id, quantity).unwrap();
            right.remove_from_cart(&shelf[target].id).unwrap();
            prop_assert_eq!(left.items(), right.items());
            prop_assert!(left.get_item(&shelf[target].id).is_none());
        }
    }
}
