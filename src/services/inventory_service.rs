use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::notification_service::{LOW_STOCK_SUBJECT, NotificationSink, low_stock_message};
use crate::{
    database::RecordStore,
    error::{AppError, Result},
    models::{self, InventoryItem, ItemPatch, NewItem},
};

/// Create/read/update/delete over a [`RecordStore`], with low-stock alerts.
///
/// A failed alert never fails the request: the write has already been
/// committed, so the failure is logged and the stored record returned.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn RecordStore>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Option<Arc<dyn NotificationSink>>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn create_item(&self, body: &Map<String, Value>) -> Result<InventoryItem> {
        let new_item = NewItem::from_body(body)?;
        let item = new_item.into_item(Uuid::new_v4().to_string(), Utc::now());

        self.store.put(&item).await?;
        tracing::info!("Created item {}", item.item_id);

        self.notify_if_low(&item).await;

        Ok(item)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<InventoryItem> {
        self.store
            .get(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    pub async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        Ok(self.store.scan().await?)
    }

    pub async fn update_item(&self, body: &Map<String, Value>) -> Result<InventoryItem> {
        let item_id = models::required_item_id(body.get("itemId"))?;
        let patch = ItemPatch::from_body(body)?;

        self.get_item(&item_id).await?;

        if !self.store.update(&item_id, &patch, Utc::now()).await? {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        tracing::info!(
            "Updated item {} ({} field(s))",
            item_id,
            patch.assignments().len()
        );

        let item = self.get_item(&item_id).await?;
        self.notify_if_low(&item).await;

        Ok(item)
    }

    /// Removes the record and returns the snapshot read before deletion.
    pub async fn delete_item(&self, item_id: Option<&str>) -> Result<InventoryItem> {
        let item_id =
            item_id.ok_or_else(|| AppError::Validation("itemId is required".to_string()))?;

        let snapshot = self.get_item(item_id).await?;
        self.store.delete(item_id).await?;
        tracing::info!("Deleted item {}", item_id);

        Ok(snapshot)
    }

    async fn notify_if_low(&self, item: &InventoryItem) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        if !item.is_low_stock() {
            return;
        }

        match notifier
            .publish(LOW_STOCK_SUBJECT, &low_stock_message(item))
            .await
        {
            Ok(()) => tracing::info!(
                "Low-stock notification sent for item {} (quantity {})",
                item.item_id,
                item.quantity
            ),
            Err(e) => tracing::warn!(
                "Low-stock notification for item {} failed: {}",
                item.item_id,
                AppError::from(e)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use serde_json::json;

    use super::*;
    use crate::{
        database::{MemoryRecordStore, StoreError},
        services::notification_service::{NotifyError, RecordingNotifier},
    };

    /// Store where a concurrent delete always wins the race against update.
    #[derive(Default)]
    struct DeletedBeforeUpdate {
        inner: MemoryRecordStore,
    }

    #[async_trait]
    impl RecordStore for DeletedBeforeUpdate {
        async fn get(&self, item_id: &str) -> std::result::Result<Option<InventoryItem>, StoreError> {
            self.inner.get(item_id).await
        }

        async fn put(&self, item: &InventoryItem) -> std::result::Result<(), StoreError> {
            self.inner.put(item).await
        }

        async fn update(
            &self,
            item_id: &str,
            patch: &ItemPatch,
            updated_at: DateTime<Utc>,
        ) -> std::result::Result<bool, StoreError> {
            self.inner.delete(item_id).await?;
            self.inner.update(item_id, patch, updated_at).await
        }

        async fn delete(&self, item_id: &str) -> std::result::Result<(), StoreError> {
            self.inner.delete(item_id).await
        }

        async fn scan(&self) -> std::result::Result<Vec<InventoryItem>, StoreError> {
            self.inner.scan().await
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    struct BrokenNotifier;

    #[async_trait]
    impl NotificationSink for BrokenNotifier {
        async fn publish(&self, _subject: &str, _message: &str) -> std::result::Result<(), NotifyError> {
            Err(NotifyError("topic does not exist".to_string()))
        }
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn service() -> (InventoryService, Arc<MemoryRecordStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryRecordStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = InventoryService::new(store.clone(), Some(notifier.clone()));
        (service, store, notifier)
    }

    #[tokio::test]
    async fn create_without_quantity_alerts() {
        let (service, _, notifier) = service();

        let item = service.create_item(&body(json!({ "name": "Tape" }))).await.unwrap();

        assert_eq!(item.quantity, 0);
        assert_eq!(item.created_at, item.updated_at);
        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, LOW_STOCK_SUBJECT);
        assert!(sent[0].message.contains("Quantity: 0"));
    }

    #[tokio::test]
    async fn create_well_stocked_item_is_silent() {
        let (service, _, notifier) = service();

        service
            .create_item(&body(json!({ "name": "Paper", "quantity": 50 })))
            .await
            .unwrap();

        assert!(notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn missing_destination_disables_alerts() {
        let store = Arc::new(MemoryRecordStore::new());
        let service = InventoryService::new(store.clone(), None);

        let item = service.create_item(&body(json!({ "quantity": 1 }))).await.unwrap();

        assert_eq!(store.get(&item.item_id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn alert_failure_does_not_fail_the_write() {
        let store = Arc::new(MemoryRecordStore::new());
        let service = InventoryService::new(store.clone(), Some(Arc::new(BrokenNotifier)));

        let item = service.create_item(&body(json!({ "quantity": 2 }))).await.unwrap();

        assert!(store.get(&item.item_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn alert_failure_on_update_keeps_the_change() {
        let store = Arc::new(MemoryRecordStore::new());
        let service = InventoryService::new(store.clone(), Some(Arc::new(BrokenNotifier)));
        let item = service
            .create_item(&body(json!({ "name": "Toner", "quantity": 40 })))
            .await
            .unwrap();

        let updated = service
            .update_item(&body(json!({ "itemId": item.item_id, "quantity": 3 })))
            .await
            .unwrap();

        assert_eq!(updated.quantity, 3);
        assert_eq!(store.get(&item.item_id).await.unwrap().unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn update_racing_a_delete_is_not_found() {
        let store = Arc::new(DeletedBeforeUpdate::default());
        let service = InventoryService::new(store.clone(), None);
        let item = service
            .create_item(&body(json!({ "name": "Lamp", "quantity": 20 })))
            .await
            .unwrap();

        let err = service
            .update_item(&body(json!({ "itemId": item.item_id, "quantity": 5 })))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn update_below_threshold_alerts() {
        let (service, _, notifier) = service();
        let item = service
            .create_item(&body(json!({ "name": "Ink", "quantity": 30 })))
            .await
            .unwrap();

        let updated = service
            .update_item(&body(json!({ "itemId": item.item_id, "quantity": 4 })))
            .await
            .unwrap();

        assert_eq!(updated.quantity, 4);
        assert!(updated.updated_at >= item.updated_at);
        assert_eq!(updated.created_at, item.created_at);
        assert_eq!(notifier.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn update_validates_before_touching_store() {
        let (service, store, _) = service();

        let err = service
            .update_item(&body(json!({ "quantity": 4 })))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_of_unknown_item_writes_nothing() {
        let (service, store, _) = service();

        let err = service
            .update_item(&body(json!({ "itemId": "nope", "quantity": 4 })))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_returns_snapshot() {
        let (service, _, _) = service();
        let item = service
            .create_item(&body(json!({ "name": "Glue", "quantity": 12, "price": 3.25 })))
            .await
            .unwrap();

        let deleted = service.delete_item(Some(&item.item_id)).await.unwrap();
        assert_eq!(deleted, item);

        let err = service.get_item(&item.item_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_requires_id_and_existing_item() {
        let (service, _, _) = service();

        assert!(matches!(
            service.delete_item(None).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.delete_item(Some("missing")).await,
            Err(AppError::NotFound(_))
        ));
    }
}
