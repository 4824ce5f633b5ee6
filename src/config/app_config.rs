use std::{env, str::FromStr};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub notifications: NotificationConfig,
    pub aws: AwsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::ConfigError(format!(
                "Invalid STORE_BACKEND value: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub table_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// `None` disables low-stock notifications.
    pub topic_arn: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match non_empty("STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::DynamoDb,
        };

        let table_name = non_empty("DYNAMODB_TABLE");
        if backend == StoreBackend::DynamoDb && table_name.is_none() {
            return Err(AppError::ConfigError("DYNAMODB_TABLE not set".to_string()));
        }

        Ok(Self {
            server: ServerConfig {
                host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: non_empty("PORT")
                    .unwrap_or_else(|| "3000".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid PORT value".to_string()))?,
                max_body_size: non_empty("MAX_BODY_SIZE")
                    .unwrap_or_else(|| "1048576".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid MAX_BODY_SIZE value".to_string()))?,
            },
            store: StoreConfig {
                backend,
                table_name,
            },
            notifications: NotificationConfig {
                topic_arn: non_empty("SNS_TOPIC_ARN"),
            },
            aws: AwsConfig {
                region: non_empty("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_with_table_only() {
        let config = config_from(&[("DYNAMODB_TABLE", "inventory")]).unwrap();

        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert_eq!(config.store.backend, StoreBackend::DynamoDb);
        assert_eq!(config.store.table_name.as_deref(), Some("inventory"));
        assert!(config.notifications.topic_arn.is_none());
        assert_eq!(config.aws.region, "us-east-1");
    }

    #[test]
    fn dynamodb_backend_requires_table() {
        assert!(matches!(config_from(&[]), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn memory_backend_needs_no_table() {
        let config = config_from(&[("STORE_BACKEND", "memory"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn blank_topic_disables_notifications() {
        let config = config_from(&[("DYNAMODB_TABLE", "t"), ("SNS_TOPIC_ARN", "  ")]).unwrap();
        assert!(config.notifications.topic_arn.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("DYNAMODB_TABLE", "t"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "postgres")]).is_err());
    }
}
