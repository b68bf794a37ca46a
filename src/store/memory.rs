use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{NewOrder, Order};
use crate::models::status::OrderStatus;
use crate::store::OrderStore;

/// In-memory stand-in for the external document store. Snapshots are
/// published in a deterministic order (creation time, then id) so ranking
/// ties break the same way on every pass.
pub struct MemoryOrderStore {
    orders: DashMap<String, Order>,
    snapshot_tx: watch::Sender<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        let (snapshot_tx, _initial_rx) = watch::channel(Vec::new());

        Self {
            orders: DashMap::new(),
            snapshot_tx,
        }
    }

    fn publish(&self) {
        let mut snapshot: Vec<Order> = self.orders.iter().map(|entry| entry.value().clone()).collect();
        snapshot.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let _ = self.snapshot_tx.send_replace(snapshot);
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    fn subscribe(&self) -> watch::Receiver<Vec<Order>> {
        self.snapshot_tx.subscribe()
    }

    async fn list(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.snapshot_tx.borrow().clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.orders.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, draft: NewOrder) -> Result<Order, AppError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            delivery_address: draft.delivery_address,
            items: draft.items,
            position: draft.position,
            status: OrderStatus::Pending,
            total: draft.total,
            updated_at: now,
        };

        self.orders.insert(order.id.clone(), order.clone());
        self.publish();

        Ok(order)
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, AppError> {
        let updated = {
            let mut entry = self
                .orders
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

            entry.status = status;
            entry.updated_at = updated_at;
            entry.clone()
        };

        self.publish();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::MemoryOrderStore;
    use crate::models::order::NewOrder;
    use crate::models::position::GeoPoint;
    use crate::models::status::OrderStatus;
    use crate::store::OrderStore;

    fn draft(name: &str) -> NewOrder {
        NewOrder {
            customer_id: "c-1".to_string(),
            customer_name: name.to_string(),
            customer_phone: "+91 90000 00000".to_string(),
            delivery_address: "12 Beach Road".to_string(),
            items: Vec::new(),
            position: GeoPoint {
                lat: 13.0827,
                lng: 80.2707,
            },
            total: 0.0,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_starts_pending() {
        let store = MemoryOrderStore::new();
        let order = store.insert(draft("Asha")).await.unwrap();

        assert!(!order.id.is_empty());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[tokio::test]
    async fn subscribers_receive_the_full_set_on_every_change() {
        let store = MemoryOrderStore::new();
        let mut rx = store.subscribe();

        assert!(rx.borrow_and_update().is_empty());

        store.insert(draft("Asha")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        let second = store.insert(draft("Ravi")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);

        store
            .update_status(&second.id, OrderStatus::Delivered, Utc::now())
            .await
            .unwrap();
        rx.changed().await.unwrap();

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 2);
        let updated = snapshot.iter().find(|o| o.id == second.id).unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn update_status_writes_status_and_timestamp_together() {
        let store = MemoryOrderStore::new();
        let order = store.insert(draft("Asha")).await.unwrap();

        let stamp = Utc::now();
        let updated = store
            .update_status(&order.id, OrderStatus::InProgress, stamp)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::InProgress);
        assert_eq!(updated.updated_at, stamp);

        let fetched = store.get(&order.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn update_status_for_unknown_order_is_not_found() {
        let store = MemoryOrderStore::new();
        let result = store
            .update_status("missing", OrderStatus::Delivered, Utc::now())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn snapshots_keep_creation_order() {
        let store = MemoryOrderStore::new();
        let first = store.insert(draft("Asha")).await.unwrap();
        let second = store.insert(draft("Ravi")).await.unwrap();

        let snapshot = store.list().await.unwrap();
        let ids: Vec<&str> = snapshot.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }
}
