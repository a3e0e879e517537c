use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::batcher::Batcher;
use crate::config::{ArchiveConfig, MissingImagePolicy};
use crate::errors;
use crate::filter;
use crate::sink::DeliverySink;
use crate::source::dynamodb_stream::StreamEvent;
use crate::telemetry::RelayMetrics;

/// Archives the pre-images of deleted rows from a DynamoDB stream batch.
///
/// Holds the long-lived sink handle; every [`Archiver::handle`] call is an
/// independent invocation with its own counters.
pub struct Archiver {
    batcher: Batcher,
    missing_image_policy: MissingImagePolicy,
}

impl Archiver {
    pub fn new(sink: Arc<dyn DeliverySink>, config: &ArchiveConfig) -> errors::Result<Self> {
        Ok(Self {
            batcher: Batcher::new(sink, config.batch_size)?,
            missing_image_policy: config.missing_image_policy,
        })
    }

    /// Runs one filter-chunk-deliver pass over a raw trigger payload.
    ///
    /// 1. Parse the stream event.
    /// 2. Keep the pre-images of REMOVE events.
    /// 3. Deliver them in chunks and total the failures the sink reports.
    pub async fn handle(&self, payload: Value) -> errors::Result<RelayMetrics> {
        let event = StreamEvent::from_value(payload)?;
        self.archive(event).await
    }

    pub async fn archive(&self, event: StreamEvent) -> errors::Result<RelayMetrics> {
        let records_received = event.records.len();
        let outcome = filter::removed_items(event.records, self.missing_image_policy)?;
        let report = self.batcher.deliver(&outcome.items).await?;

        let metrics = RelayMetrics {
            records_received,
            removed_items: outcome.items.len(),
            skipped_items: outcome.skipped,
            batches_sent: report.batches_sent,
            bytes_submitted: report.bytes_submitted,
            failed_put_count: report.failed_put_count,
        };
        info!(
            records = metrics.records_received,
            removed = metrics.removed_items,
            failures = metrics.failed_put_count,
            "Archive invocation finished"
        );
        Ok(metrics)
    }
}
