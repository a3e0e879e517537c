pub mod aws;
pub mod dynamodb;
pub mod firehose;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{DeliveryError, StoreError};

/// What the delivery stream reported for one batch-submission call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutBatchOutcome {
    /// Records in the call that were not persisted.
    pub failed_put_count: usize,
}

/// The durable, append-only destination for archived records.
///
/// One call submits an ordered list of opaque blobs. `Ok(None)` means the
/// sink returned no result for the call.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn put_record_batch(
        &self,
        records: Vec<Vec<u8>>,
    ) -> Result<Option<PutBatchOutcome>, DeliveryError>;
}

/// A row written by the record-data function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredItem {
    pub device: String,
    /// Seconds since the Unix epoch.
    pub timestamp: Decimal,
    /// Expiry in seconds since the Unix epoch.
    pub ttl: Decimal,
    pub payload: Value,
}

/// The table the record-data function upserts into.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn put_item(&self, item: StoredItem) -> Result<(), StoreError>;
}
