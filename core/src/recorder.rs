use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::config::RecordConfig;
use crate::errors;
use crate::errors::EventError;
use crate::sink::{StoredItem, TableStore};
use crate::source::device_event::DeviceEvent;

/// Converts a millisecond timestamp to seconds without leaving decimal
/// arithmetic.
pub fn millis_to_seconds(timestamp_ms: i64) -> Decimal {
    Decimal::new(timestamp_ms, 3)
}

/// Builds the stored row for `event`, expiring `record_ttl` seconds after it
/// was recorded.
pub fn build_item(event: DeviceEvent, record_ttl: Decimal) -> Result<StoredItem, EventError> {
    event.recorded_at()?;
    let timestamp = millis_to_seconds(event.timestamp);
    let ttl = timestamp
        .checked_add(record_ttl)
        .ok_or(EventError::TimestampOutOfRange {
            timestamp_ms: event.timestamp,
        })?;

    Ok(StoredItem {
        device: event.device_id,
        timestamp,
        ttl,
        payload: event.payload,
    })
}

/// Writes single device readings to the table with an expiry attribute.
pub struct RecordWriter {
    store: Arc<dyn TableStore>,
    record_ttl: Decimal,
}

impl RecordWriter {
    pub fn new(store: Arc<dyn TableStore>, config: &RecordConfig) -> Self {
        Self {
            store,
            record_ttl: config.record_ttl,
        }
    }

    pub async fn handle(&self, payload: Value) -> errors::Result<()> {
        let event = DeviceEvent::from_value(payload)?;
        self.write(event).await
    }

    pub async fn write(&self, event: DeviceEvent) -> errors::Result<()> {
        let item = build_item(event, self.record_ttl)?;
        let device = item.device.clone();
        let timestamp = item.timestamp;

        self.store.put_item(item).await?;

        info!(device = %device, timestamp = %timestamp, "Data saved successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::errors::{RelayError, StoreError};
    use crate::sink::MockTableStore;
    use serde_json::json;
    use std::str::FromStr;

    fn config(ttl: &str) -> RecordConfig {
        RecordConfig {
            table_name: "motion".to_string(),
            record_ttl: Decimal::from_str(ttl).unwrap(),
            client: ClientOptions::default(),
        }
    }

    fn event(timestamp: i64) -> DeviceEvent {
        DeviceEvent {
            timestamp,
            device_id: "sensor-7".to_string(),
            payload: json!({"motion": true}),
        }
    }

    #[test]
    fn test_build_item_exact_decimal() {
        let item = build_item(event(1700000000000), Decimal::from_str("3600.0").unwrap()).unwrap();

        assert_eq!(item.timestamp, Decimal::from_str("1700000000.0").unwrap());
        assert_eq!(item.ttl, Decimal::from_str("1700003600.0").unwrap());
        assert_eq!(item.device, "sensor-7");
        assert_eq!(item.payload, json!({"motion": true}));
    }

    #[test]
    fn test_build_item_keeps_millisecond_fraction() {
        let item = build_item(event(1700000000001), Decimal::new(1, 1)).unwrap();

        assert_eq!(item.timestamp.to_string(), "1700000000.001");
        assert_eq!(item.ttl.to_string(), "1700000000.101");
    }

    #[test]
    fn test_build_item_rejects_out_of_range_timestamp() {
        let err = build_item(event(i64::MAX), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, EventError::TimestampOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_handle_writes_one_item() {
        let mut store = MockTableStore::new();
        store
            .expect_put_item()
            .times(1)
            .withf(|item| {
                item.device == "sensor-7"
                    && item.timestamp == Decimal::new(1700000000, 0)
                    && item.ttl == Decimal::new(1700003600, 0)
            })
            .returning(|_| Ok(()));
        let writer = RecordWriter::new(Arc::new(store), &config("3600"));

        writer
            .handle(json!({
                "timestamp": 1700000000000i64,
                "device_id": "sensor-7",
                "payload": {"motion": true}
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockTableStore::new();
        store.expect_put_item().returning(|_| {
            Err(StoreError::Request {
                table: "motion".to_string(),
                reason: "ProvisionedThroughputExceededException".to_string(),
            })
        });
        let writer = RecordWriter::new(Arc::new(store), &config("60"));

        let err = writer.write(event(1700000000000)).await.unwrap_err();
        assert!(matches!(err, RelayError::Store(StoreError::Request { .. })));
    }

    #[tokio::test]
    async fn test_malformed_event_never_reaches_store() {
        let mut store = MockTableStore::new();
        store.expect_put_item().never();
        let writer = RecordWriter::new(Arc::new(store), &config("60"));

        let err = writer
            .handle(json!({"timestamp": "yesterday", "device_id": "d", "payload": {}}))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Event(EventError::Malformed { .. })));
    }
}
