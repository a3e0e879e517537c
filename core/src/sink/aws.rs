use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::config::ClientOptions;

/// Resolves the shared AWS config once per process. Credentials always come
/// from the default provider chain.
pub async fn load_sdk_config(options: &ClientOptions) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint_url) = &options.endpoint_url {
        info!(endpoint_url = %endpoint_url, "Using endpoint override");
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}
