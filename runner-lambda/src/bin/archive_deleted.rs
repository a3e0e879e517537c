use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use relay_core::archiver::Archiver;
use relay_core::config::{ArchiveConfig, CONFIG_FILE_ENV, load_config};
use relay_core::sink::aws::load_sdk_config;
use relay_core::sink::firehose::FirehoseSink;
use relay_core::telemetry::{RelayMetrics, init_tracing};
use serde_json::Value;
use tracing::error;

/// Entry point for the DynamoDB stream trigger: archives the pre-images of
/// deleted rows to a Firehose delivery stream.
async fn lambda_handler(
    archiver: &Archiver,
    event: LambdaEvent<Value>,
) -> Result<RelayMetrics, Error> {
    match archiver.handle(event.payload).await {
        Ok(metrics) => Ok(metrics),
        Err(e) => {
            error!(retryable = e.is_retryable(), "Archive invocation failed: {e}");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config_path = std::env::var(CONFIG_FILE_ENV).ok();
    let config: ArchiveConfig =
        load_config(config_path.as_deref()).context("Failed to load archive config")?;
    let sdk_config = load_sdk_config(&config.client).await;
    let sink = FirehoseSink::new(&sdk_config, config.delivery_stream_name.clone());
    let archiver = Archiver::new(Arc::new(sink), &config)?;

    lambda_runtime::run(service_fn(|event| lambda_handler(&archiver, event))).await
}
