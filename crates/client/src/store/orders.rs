//! Orders slice: checkout and order history.

use atelier_core::{NewOrder, Order, OrderId};

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::Backend;

const PLACE_FAILED: &str = "Failed to place order";
const FETCH_ALL_FAILED: &str = "Failed to fetch orders";
const FETCH_FAILED: &str = "Failed to fetch order";
const ADDRESS_INCOMPLETE: &str = "Shipping address is incomplete";

/// Order history, newest first, and the order on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orders {
    pub list: Vec<Order>,
    pub current: Option<Order>,
}

#[derive(Debug)]
pub struct OrdersSlice {
    slice: Slice<Orders>,
}

impl Default for OrdersSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("orders", Orders::default()),
        }
    }
}

impl OrdersSlice {
    /// Check out the current cart. The placed order becomes `current` and
    /// heads the history.
    pub async fn place(&self, backend: &impl Backend, order: NewOrder) -> Lifecycle {
        let address = &order.shipping_address;
        let required = [&address.street, &address.city, &address.state, &address.zip_code];
        if required.iter().any(|field| field.trim().is_empty()) {
            return self.slice.reject_locally("place", ADDRESS_INCOMPLETE);
        }

        self.slice
            .run("place", PLACE_FAILED, backend.create_order(&order), |orders, placed| {
                orders.list.retain(|o| o.id != placed.id);
                orders.list.insert(0, placed.clone());
                orders.current = Some(placed);
            })
            .await
    }

    /// Replace the history with the backend's.
    pub async fn fetch_all(&self, backend: &impl Backend) -> Lifecycle {
        self.slice
            .run("fetch_all", FETCH_ALL_FAILED, backend.list_orders(), |orders, list| {
                orders.list = list;
            })
            .await
    }

    /// Load one order into `current`, refreshing its history entry.
    pub async fn fetch(&self, backend: &impl Backend, id: &OrderId) -> Lifecycle {
        self.slice
            .run("fetch", FETCH_FAILED, backend.get_order(id), |orders, order| {
                if let Some(existing) = orders.list.iter_mut().find(|o| o.id == order.id) {
                    *existing = order.clone();
                }
                orders.current = Some(order);
            })
            .await
    }

    pub fn reset(&self) {
        self.slice.reset();
    }

    #[must_use]
    pub fn list(&self) -> Vec<Order> {
        self.slice.read(|r| r.data().list.clone())
    }

    #[must_use]
    pub fn current(&self) -> Option<Order> {
        self.slice.read(|r| r.data().current.clone())
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Orders> {
        self.slice.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AsyncResource<Orders>> {
        self.slice.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBackend, new_order, order_json};
    use atelier_core::OrderStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_place_heads_history_and_becomes_current() {
        let backend = ScriptedBackend::new();
        backend.respond("list_orders", json!([order_json("o1", "p1", 1)]));
        backend.respond("create_order", order_json("o2", "p2", 3));

        let orders = OrdersSlice::default();
        orders.fetch_all(&backend).await;
        let outcome = orders.place(&backend, new_order()).await;

        assert_eq!(outcome, Lifecycle::Fulfilled);
        let ids: Vec<_> = orders.list().into_iter().map(|o| o.id.into_inner()).collect();
        assert_eq!(ids, vec!["o2", "o1"]);
        assert_eq!(orders.current().map(|o| o.id), Some(OrderId::new("o2")));

        let sent = backend.calls_to("create_order");
        assert_eq!(sent.first().unwrap()["paymentMethod"], "cod");
    }

    #[tokio::test]
    async fn test_blank_address_rejected_without_request() {
        let backend = ScriptedBackend::new();
        let mut order = new_order();
        order.shipping_address.city = "  ".to_string();

        let orders = OrdersSlice::default();
        assert_eq!(orders.place(&backend, order).await, Lifecycle::Rejected);
        assert_eq!(orders.snapshot().error(), Some(ADDRESS_INCOMPLETE));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_accepts_wrapped_list() {
        let backend = ScriptedBackend::new();
        backend.respond(
            "list_orders",
            json!({ "orders": [order_json("o1", "p1", 1), order_json("o2", "p1", 2)] }),
        );

        let orders = OrdersSlice::default();
        assert_eq!(orders.fetch_all(&backend).await, Lifecycle::Fulfilled);
        assert_eq!(orders.list().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_refreshes_history_entry() {
        let backend = ScriptedBackend::new();
        backend.respond("list_orders", json!([order_json("o1", "p1", 1)]));
        let mut shipped = order_json("o1", "p1", 1);
        shipped["status"] = json!("shipped");
        backend.respond("get_order", shipped);

        let orders = OrdersSlice::default();
        orders.fetch_all(&backend).await;
        orders.fetch(&backend, &OrderId::new("o1")).await;

        assert_eq!(orders.list().first().map(|o| o.status), Some(OrderStatus::Shipped));
        assert_eq!(orders.current().map(|o| o.status), Some(OrderStatus::Shipped));
        assert_eq!(backend.calls_to("get_order").first().unwrap()["id"], "o1");
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_history() {
        let backend = ScriptedBackend::new();
        backend.respond("list_orders", json!([order_json("o1", "p1", 1)]));
        backend.fail("create_order", 400, Some("Cart is empty"));

        let orders = OrdersSlice::default();
        orders.fetch_all(&backend).await;
        let outcome = orders.place(&backend, new_order()).await;

        assert_eq!(outcome, Lifecycle::Rejected);
        assert_eq!(orders.snapshot().error(), Some("Cart is empty"));
        assert_eq!(orders.list().len(), 1);
        assert!(orders.current().is_none());
    }
}
