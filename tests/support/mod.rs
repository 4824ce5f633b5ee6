use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_api::{
    app,
    database::{MemoryRecordStore, RecordStore, StoreError},
    models::{InventoryItem, ItemPatch},
    services::{InventoryService, NotificationSink, NotifyError, RecordingNotifier},
};

pub struct TestApp {
    pub base: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryRecordStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryRecordStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = InventoryService::new(store.clone(), Some(notifier.clone()));

    TestApp {
        base: serve(app::router(service, 1024 * 1024)).await,
        client: reqwest::Client::new(),
        store,
        notifier,
    }
}

pub async fn spawn_with(
    store: Arc<dyn RecordStore>,
    notifier: Option<Arc<dyn NotificationSink>>,
) -> String {
    serve(app::router(InventoryService::new(store, notifier), 1024 * 1024)).await
}

/// Store whose every call fails, as an unreachable table would.
pub struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError("ResourceNotFoundException: table not found".to_string())
}

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn get(&self, _item_id: &str) -> Result<Option<InventoryItem>, StoreError> {
        Err(unavailable())
    }

    async fn put(&self, _item: &InventoryItem) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _item_id: &str,
        _patch: &ItemPatch,
        _updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _item_id: &str) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn scan(&self) -> Result<Vec<InventoryItem>, StoreError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

/// Sink that rejects every publish, as a deleted topic would.
pub struct FailingNotifier;

#[async_trait]
impl NotificationSink for FailingNotifier {
    async fn publish(&self, _subject: &str, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError("NotFound: Topic does not exist".to_string()))
    }
}
