mod connection;
mod dynamo;
mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{InventoryItem, ItemPatch};

pub use connection::create_store;
pub use dynamo::{DynamoRecordStore, UpdateExpression};
pub use memory::MemoryRecordStore;

/// Failure reported by a record store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

/// Key-value persistence for inventory records, keyed by `itemId`.
///
/// Single-record calls are atomic; nothing here offers compare-and-swap.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, item_id: &str) -> Result<Option<InventoryItem>, StoreError>;

    /// Unconditional overwrite.
    async fn put(&self, item: &InventoryItem) -> Result<(), StoreError>;

    /// Sets the patched attributes and `updatedAt`, leaving the rest alone.
    ///
    /// Returns `false` without writing when no record has `item_id`.
    async fn update(
        &self,
        item_id: &str,
        patch: &ItemPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, item_id: &str) -> Result<(), StoreError>;

    /// Every stored record in backend order.
    async fn scan(&self) -> Result<Vec<InventoryItem>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
