mod app_config;
mod sdk_config;

pub use app_config::{
    AppConfig, AwsConfig, NotificationConfig, ServerConfig, StoreBackend, StoreConfig,
};
pub use sdk_config::load_sdk_config;
