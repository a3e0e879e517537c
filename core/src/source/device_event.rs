use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EventError;

/// One telemetry reading sent by a device.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub device_id: String,
    pub payload: Value,
}

impl DeviceEvent {
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        serde_json::from_value(value).map_err(|e| EventError::Malformed {
            reason: format!("invalid device event: {e}"),
        })
    }

    /// The reading time, or an error if it falls outside the calendar range.
    pub fn recorded_at(&self) -> Result<DateTime<Utc>, EventError> {
        DateTime::from_timestamp_millis(self.timestamp).ok_or(EventError::TimestampOutOfRange {
            timestamp_ms: self.timestamp,
        })
    }
}
