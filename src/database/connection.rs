use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;

use super::{DynamoRecordStore, MemoryRecordStore, RecordStore};
use crate::{
    config::{self, AwsConfig, StoreBackend, StoreConfig},
    error::{AppError, Result},
};

pub async fn create_store(store: &StoreConfig, aws: &AwsConfig) -> Result<Arc<dyn RecordStore>> {
    match store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
        StoreBackend::DynamoDb => {
            let table = store.table_name.clone().ok_or_else(|| {
                AppError::ConfigError("DYNAMODB_TABLE not set".to_string())
            })?;

            let sdk_config = config::load_sdk_config(aws).await;
            let client = DynamoClient::new(&sdk_config);

            tracing::info!("DynamoDB record store initialized for table {}", table);

            Ok(Arc::new(DynamoRecordStore::new(client, table)))
        }
    }
}
