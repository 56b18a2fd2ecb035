//! Orders and their lifecycle.
//!
//! ```text
//!            cancel (owner)
//! pending ──────────────────▶ cancelled
//!    │
//!    │ advance (admin)
//!    ▼
//! shipped ──advance (admin)──▶ delivered
//! ```
//!
//! There are two ways to change a status, each with its own authority:
//! - [`OrderStore::cancel_order`] is the customer transition and only leaves
//!   `pending`.
//! - [`OrderStore::update_order_status`] is the administrative override. It
//!   sets any status and ignores the graph above.
//!
//! An order's items and total are fixed at creation. Later catalog edits never
//! reach a stored order.

use crate::error::{BookhubError, Result};
use crate::model::{new_id, NewOrder, Order, OrderStatus};
use crate::store::{load_json, save_json, StorageBackend, ORDERS_KEY};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

pub struct OrderStore<B: StorageBackend> {
    backend: B,
    delivery_days: u32,
    orders: Vec<Order>,
}

impl<B: StorageBackend> OrderStore<B> {
    pub fn load(backend: B, delivery_days: u32) -> Result<Self> {
        let orders = load_json(&backend, ORDERS_KEY)?.unwrap_or_default();
        Ok(Self {
            backend,
            delivery_days,
            orders,
        })
    }

    /// Every order in insertion order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get_order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    /// Record a paid order. Payment must already have succeeded; this layer
    /// performs no stock or payment checks.
    pub fn create_order(&mut self, new_order: NewOrder) -> Result<Order> {
        let created_at = Utc::now();
        let order = Order {
            id: new_id(),
            user_id: new_order.user_id,
            items: new_order.items,
            total_amount: new_order.total_amount,
            shipping_address: new_order.shipping_address,
            status: OrderStatus::Pending,
            payment_id: new_order.payment_id,
            created_at,
            estimated_delivery: self.delivery_estimate(created_at),
        };

        let mut orders = self.orders.clone();
        orders.push(order.clone());
        self.commit(orders)?;
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            "order created"
        );
        Ok(order)
    }

    /// `None` when the configured delay runs past the calendar chrono supports.
    fn delivery_estimate(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let estimate = Duration::try_days(i64::from(self.delivery_days))
            .and_then(|delay| created_at.checked_add_signed(delay));
        if estimate.is_none() {
            warn!(delivery_days = self.delivery_days, "delivery estimate out of range");
        }
        estimate
    }

    /// Administrative override: set any status, whatever the current one.
    pub fn update_order_status(&mut self, order_id: &str, status: OrderStatus) -> Result<()> {
        let pos = self.position(order_id)?;
        let mut orders = self.orders.clone();
        let previous = orders[pos].status;
        orders[pos].status = status;
        self.commit(orders)?;
        info!(order_id, from = %previous, to = %status, "order status overridden");
        Ok(())
    }

    /// Customer cancellation, allowed only while the order is pending.
    pub fn cancel_order(&mut self, order_id: &str) -> Result<()> {
        let pos = self.position(order_id)?;
        let status = self.orders[pos].status;
        if !status.is_cancellable() {
            warn!(order_id, %status, "cancellation rejected");
            return Err(BookhubError::CannotCancel {
                id: order_id.to_string(),
                status,
            });
        }
        let mut orders = self.orders.clone();
        orders[pos].status = OrderStatus::Cancelled;
        self.commit(orders)?;
        info!(order_id, "order cancelled");
        Ok(())
    }

    /// Orders placed by `user_id`, in insertion order. Callers choose any
    /// display ordering.
    pub fn get_user_orders(&self, user_id: &str) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| order.user_id == user_id)
            .collect()
    }

    /// Orders whose id contains `term` (case-insensitive), newest first.
    pub fn search_orders(&self, term: &str) -> Vec<&Order> {
        let needle = term.trim().to_lowercase();
        let mut found: Vec<&Order> = self
            .orders
            .iter()
            .filter(|order| order.id.to_lowercase().contains(&needle))
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    fn position(&self, order_id: &str) -> Result<usize> {
        self.orders
            .iter()
            .position(|order| order.id == order_id)
            .ok_or_else(|| BookhubError::not_found("Order", order_id))
    }

    fn commit(&mut self, orders: Vec<Order>) -> Result<()> {
        save_json(&self.backend, ORDERS_KEY, &orders)?;
        self.orders = orders;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookInput, CartItem, ShippingAddress};
    use crate::store::mem_backend::MemBackend;
    use rust_decimal::Decimal;
    use std::rc::Rc;

    fn new_order(user_id: &str) -> NewOrder {
        let book = BookInput {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            category: "Science Fiction".into(),
            price: Decimal::from(100),
            ..Default::default()
        }
        .into_book("b-1".into(), Utc::now())
        .unwrap();
        NewOrder {
            user_id: user_id.into(),
            items: vec![CartItem { book, quantity: 2 }],
            total_amount: Decimal::new(23600, 2),
            shipping_address: ShippingAddress {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                phone: "9999999999".into(),
                address: "1 MG Road".into(),
                city: "Pune".into(),
                state: "MH".into(),
                pincode: "411001".into(),
            },
            payment_id: "pay_123".into(),
        }
    }

    fn store() -> OrderStore<Rc<MemBackend>> {
        OrderStore::load(Rc::new(MemBackend::new()), 7).unwrap()
    }

    #[test]
    fn create_order_starts_pending_with_delivery_estimate() {
        let mut store = store();
        let order = store.create_order(new_order("u-1")).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_id, "pay_123");
        assert_eq!(order.total_amount, Decimal::new(23600, 2));
        assert_eq!(
            order.estimated_delivery,
            Some(order.created_at + Duration::days(7))
        );
        assert_eq!(store.get_order(&order.id), Some(&order));
    }

    #[test]
    fn unreachable_delivery_date_is_left_open() {
        let backend = Rc::new(MemBackend::new());
        let mut store = OrderStore::load(Rc::clone(&backend), u32::MAX).unwrap();
        let order = store.create_order(new_order("u-1")).unwrap();
        assert_eq!(order.estimated_delivery, None);

        let reloaded = OrderStore::load(backend, u32::MAX).unwrap();
        assert_eq!(reloaded.get_order(&order.id), Some(&order));
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut store = store();
        let order = store.create_order(new_order("u-1")).unwrap();

        store.cancel_order(&order.id).unwrap();
        assert_eq!(
            store.get_order(&order.id).unwrap().status,
            OrderStatus::Cancelled
        );

        let err = store.cancel_order(&order.id).unwrap_err();
        assert!(matches!(
            err,
            BookhubError::CannotCancel {
                status: OrderStatus::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn cancel_rejected_after_shipping() {
        let mut store = store();
        for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
            let order = store.create_order(new_order("u-1")).unwrap();
            store.update_order_status(&order.id, status).unwrap();
            assert!(matches!(
                store.cancel_order(&order.id),
                Err(BookhubError::CannotCancel { .. })
            ));
            assert_eq!(store.get_order(&order.id).unwrap().status, status);
        }
    }

    #[test]
    fn cancel_unknown_order_is_not_found() {
        let mut store = store();
        assert!(matches!(
            store.cancel_order("nope"),
            Err(BookhubError::NotFound { kind: "Order", .. })
        ));
    }

    #[test]
    fn admin_override_ignores_the_graph() {
        let mut store = store();
        let order = store.create_order(new_order("u-1")).unwrap();
        store
            .update_order_status(&order.id, OrderStatus::Delivered)
            .unwrap();
        store
            .update_order_status(&order.id, OrderStatus::Pending)
            .unwrap();
        assert_eq!(
            store.get_order(&order.id).unwrap().status,
            OrderStatus::Pending
        );
        assert!(store.update_order_status("nope", OrderStatus::Shipped).is_err());
    }

    #[test]
    fn user_orders_keep_insertion_order() {
        let mut store = store();
        let first = store.create_order(new_order("u-1")).unwrap();
        store.create_order(new_order("u-2")).unwrap();
        let second = store.create_order(new_order("u-1")).unwrap();

        let ids: Vec<&str> = store
            .get_user_orders("u-1")
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, [first.id.as_str(), second.id.as_str()]);
        assert!(store.get_user_orders("u-3").is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut store = store();
        let order = store.create_order(new_order("u-1")).unwrap();
        store.create_order(new_order("u-1")).unwrap();

        let fragment = order.id[..8].to_uppercase();
        let found = store.search_orders(&fragment);
        assert!(found.iter().any(|o| o.id == order.id));
        assert_eq!(store.search_orders("").len(), 2);
    }

    #[test]
    fn orders_are_rehydrated() {
        let backend = Rc::new(MemBackend::new());
        let mut store = OrderStore::load(Rc::clone(&backend), 7).unwrap();
        let order = store.create_order(new_order("u-1")).unwrap();
        store.cancel_order(&order.id).unwrap();

        let reloaded = OrderStore::load(backend, 7).unwrap();
        assert_eq!(reloaded.orders(), store.orders());
    }

    #[test]
    fn failed_write_keeps_status() {
        let backend = Rc::new(MemBackend::new());
        let mut store = OrderStore::load(Rc::clone(&backend), 7).unwrap();
        let order = store.create_order(new_order("u-1")).unwrap();
        backend.set_simulate_write_error(true);
        assert!(store.cancel_order(&order.id).is_err());
        assert_eq!(
            store.get_order(&order.id).unwrap().status,
            OrderStatus::Pending
        );
    }
}
