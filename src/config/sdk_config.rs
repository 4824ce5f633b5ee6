use aws_config::{BehaviorVersion, Region, SdkConfig};

use super::AwsConfig;

/// Shared SDK configuration for every AWS client the service builds.
///
/// Credentials come from the default provider chain (env, profile, IMDS).
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(aws.region.clone()))
        .load()
        .await;

    tracing::info!("AWS SDK configuration loaded for region {}", aws.region);

    config
}
