pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::AppError;
use crate::models::order::{NewOrder, Order};
use crate::models::status::OrderStatus;

pub use memory::MemoryOrderStore;

/// Narrow interface over the external document store's "orders" collection.
/// Subscribers receive the full current set on every change, not a diff.
#[async_trait]
pub trait OrderStore: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Vec<Order>>;

    async fn list(&self) -> Result<Vec<Order>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Order>, AppError>;

    async fn insert(&self, draft: NewOrder) -> Result<Order, AppError>;

    /// Partial update of `{status, updatedAt}`, atomic per document.
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Order, AppError>;
}
