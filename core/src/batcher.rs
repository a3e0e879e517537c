use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{ConfigError, Result};
use crate::sink::DeliverySink;
use crate::source::DeletedItem;

/// Largest record Firehose accepts, before base64 encoding.
pub const MAX_RECORD_BYTES: usize = 1_000 * 1024;

/// Totals for one call to [`Batcher::deliver`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub batches_sent: usize,
    /// Bytes handed to the sink, including records it reported as failed.
    pub bytes_submitted: u64,
    pub failed_put_count: usize,
}

/// Splits `items` into contiguous chunks of `batch_size`; only the last may
/// be shorter, and none is empty.
///
/// # Panics
///
/// Panics if `batch_size` is zero.
pub fn chunks(items: &[DeletedItem], batch_size: usize) -> std::slice::Chunks<'_, DeletedItem> {
    items.chunks(batch_size)
}

/// Frames one chunk as a delivery record: a JSON array and a trailing newline.
/// The delivery stream relies on the newline to split records downstream.
pub fn encode_record(chunk: &[DeletedItem]) -> Result<Vec<u8>> {
    let mut record = serde_json::to_vec(chunk)?;
    record.push(b'\n');
    Ok(record)
}

/// Turns a list of deleted items into delivery-stream records.
pub struct Batcher {
    sink: Arc<dyn DeliverySink>,
    batch_size: usize,
}

impl Batcher {
    pub fn new(sink: Arc<dyn DeliverySink>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "Batch size must be at least 1".to_string(),
            }
            .into());
        }
        Ok(Self { sink, batch_size })
    }

    /// Sends each chunk of `items` as one record in its own
    /// `put_record_batch` call and sums the failures the sink reports.
    ///
    /// Partial failures are counted, not raised. A call-level sink error
    /// stops delivery and is returned.
    pub async fn deliver(&self, items: &[DeletedItem]) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();
        if items.is_empty() {
            return Ok(report);
        }

        for chunk in chunks(items, self.batch_size) {
            let record = encode_record(chunk)?;
            if record.len() > MAX_RECORD_BYTES {
                warn!(
                    bytes = record.len(),
                    items = chunk.len(),
                    "Record exceeds the delivery stream size limit"
                );
            }
            let bytes = record.len() as u64;

            let outcome = self.sink.put_record_batch(vec![record]).await?;
            if let Some(outcome) = outcome {
                report.failed_put_count += outcome.failed_put_count;
            }
            report.batches_sent += 1;
            report.bytes_submitted += bytes;
        }

        info!(
            batches = report.batches_sent,
            failures = report.failed_put_count,
            "All items processed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DeliveryError, RelayError};
    use crate::sink::{MockDeliverySink, PutBatchOutcome};
    use serde_json::{Map, Value, json};

    fn items(n: usize) -> Vec<DeletedItem> {
        (0..n)
            .map(|i| {
                let mut image = Map::new();
                image.insert("id".to_string(), json!({ "N": i.to_string() }));
                DeletedItem::new(image)
            })
            .collect()
    }

    fn decode(record: &[u8]) -> Vec<Value> {
        assert_eq!(record.last(), Some(&b'\n'));
        serde_json::from_slice(&record[..record.len() - 1]).unwrap()
    }

    #[test]
    fn test_encode_record_is_newline_terminated_array() {
        let record = encode_record(&items(2)).unwrap();
        assert_eq!(
            String::from_utf8(record).unwrap(),
            "[{\"id\":{\"N\":\"0\"}},{\"id\":{\"N\":\"1\"}}]\n"
        );
    }

    #[test]
    fn test_chunk_boundaries() {
        let input = items(7);
        let sizes: Vec<_> = chunks(&input, 3).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        let sizes: Vec<_> = chunks(&input, 7).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![7]);

        let sizes: Vec<_> = chunks(&input, 8).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![7]);

        assert_eq!(chunks(&[], 3).count(), 0);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let sink = MockDeliverySink::new();
        assert!(matches!(
            Batcher::new(Arc::new(sink), 0),
            Err(RelayError::Config(ConfigError::ValidationFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let mut sink = MockDeliverySink::new();
        sink.expect_put_record_batch().never();

        let batcher = Batcher::new(Arc::new(sink), 10).unwrap();
        let report = batcher.deliver(&[]).await.unwrap();

        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn test_one_record_per_chunk() {
        let mut sink = MockDeliverySink::new();
        let mut sizes = Vec::new();
        sink.expect_put_record_batch()
            .times(3)
            .returning(move |records| {
                assert_eq!(records.len(), 1);
                sizes.push(decode(&records[0]).len());
                if sizes.len() == 3 {
                    assert_eq!(sizes, vec![2, 2, 1]);
                }
                Ok(Some(PutBatchOutcome::default()))
            });

        let batcher = Batcher::new(Arc::new(sink), 2).unwrap();
        let report = batcher.deliver(&items(5)).await.unwrap();

        assert_eq!(report.batches_sent, 3);
        assert_eq!(report.failed_put_count, 0);
    }

    #[tokio::test]
    async fn test_failures_are_summed_and_missing_results_count_zero() {
        let mut sink = MockDeliverySink::new();
        let mut call = 0;
        sink.expect_put_record_batch()
            .times(4)
            .returning(move |_| {
                call += 1;
                match call {
                    1 => Ok(Some(PutBatchOutcome { failed_put_count: 1 })),
                    2 => Ok(None),
                    3 => Ok(Some(PutBatchOutcome { failed_put_count: 0 })),
                    _ => Ok(Some(PutBatchOutcome { failed_put_count: 1 })),
                }
            });

        let batcher = Batcher::new(Arc::new(sink), 1).unwrap();
        let report = batcher.deliver(&items(4)).await.unwrap();

        assert_eq!(report.batches_sent, 4);
        assert_eq!(report.failed_put_count, 2);
    }

    #[tokio::test]
    async fn test_exact_multiple_and_one_over() {
        let mut sink = MockDeliverySink::new();
        sink.expect_put_record_batch()
            .times(1)
            .withf(|records| decode(&records[0]).len() == 4)
            .returning(|_| Ok(Some(PutBatchOutcome::default())));
        let batcher = Batcher::new(Arc::new(sink), 4).unwrap();
        assert_eq!(batcher.deliver(&items(4)).await.unwrap().batches_sent, 1);

        let mut sink = MockDeliverySink::new();
        let mut sizes = Vec::new();
        sink.expect_put_record_batch()
            .times(2)
            .returning(move |records| {
                sizes.push(decode(&records[0]).len());
                if sizes.len() == 2 {
                    assert_eq!(sizes, vec![4, 1]);
                }
                Ok(Some(PutBatchOutcome::default()))
            });
        let batcher = Batcher::new(Arc::new(sink), 4).unwrap();
        assert_eq!(batcher.deliver(&items(5)).await.unwrap().batches_sent, 2);
    }

    #[tokio::test]
    async fn test_oversized_record_is_still_submitted() {
        let mut image = Map::new();
        image.insert(
            "blob".to_string(),
            json!({ "S": "x".repeat(MAX_RECORD_BYTES) }),
        );
        let input = vec![DeletedItem::new(image)];
        let expected = encode_record(&input).unwrap();
        assert!(expected.len() > MAX_RECORD_BYTES);
        let expected_len = expected.len() as u64;

        let mut sink = MockDeliverySink::new();
        sink.expect_put_record_batch()
            .times(1)
            .withf(move |records| records.len() == 1 && records[0] == expected)
            .returning(|_| Ok(Some(PutBatchOutcome { failed_put_count: 1 })));

        let batcher = Batcher::new(Arc::new(sink), 10).unwrap();
        let report = batcher.deliver(&input).await.unwrap();

        assert_eq!(
            report,
            DeliveryReport {
                batches_sent: 1,
                bytes_submitted: expected_len,
                failed_put_count: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_sink_error_stops_delivery() {
        let mut sink = MockDeliverySink::new();
        sink.expect_put_record_batch().times(1).returning(|_| {
            Err(DeliveryError::Request {
                stream: "archive".to_string(),
                reason: "ServiceUnavailableException".to_string(),
            })
        });

        let batcher = Batcher::new(Arc::new(sink), 1).unwrap();
        let err = batcher.deliver(&items(3)).await.unwrap_err();

        assert!(matches!(err, RelayError::Delivery(DeliveryError::Request { .. })));
        assert!(err.is_retryable());
    }
}
