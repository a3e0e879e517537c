use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use relay_core::config::{CONFIG_FILE_ENV, RecordConfig, load_config};
use relay_core::recorder::RecordWriter;
use relay_core::sink::aws::load_sdk_config;
use relay_core::sink::dynamodb::DynamoDbStore;
use relay_core::telemetry::init_tracing;
use serde_json::Value;
use tracing::error;

/// Entry point for device telemetry: stores one reading with an expiry time.
async fn lambda_handler(writer: &RecordWriter, event: LambdaEvent<Value>) -> Result<(), Error> {
    writer.handle(event.payload).await.map_err(|e| {
        error!(retryable = e.is_retryable(), "Record invocation failed: {e}");
        e.into()
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config_path = std::env::var(CONFIG_FILE_ENV).ok();
    let config: RecordConfig =
        load_config(config_path.as_deref()).context("Failed to load record config")?;
    let sdk_config = load_sdk_config(&config.client).await;
    let store = DynamoDbStore::new(&sdk_config, config.table_name.clone());
    let writer = RecordWriter::new(Arc::new(store), &config);

    lambda_runtime::run(service_fn(|event| lambda_handler(&writer, event))).await
}
