use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};
use crate::models::{InventoryItem, ItemPatch};

/// Process-local store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    items: RwLock<HashMap<String, InventoryItem>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, item_id: &str) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.items.read().await.get(item_id).cloned())
    }

    async fn put(&self, item: &InventoryItem) -> Result<(), StoreError> {
        self.items
            .write()
            .await
            .insert(item.item_id.clone(), item.clone());
        Ok(())
    }

    async fn update(
        &self,
        item_id: &str,
        patch: &ItemPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(item_id) else {
            return Ok(false);
        };
        patch.apply(item, updated_at);
        Ok(true)
    }

    async fn delete(&self, item_id: &str) -> Result<(), StoreError> {
        self.items.write().await.remove(item_id);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
