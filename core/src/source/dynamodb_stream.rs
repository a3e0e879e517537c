use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EventError;
use crate::source::Image;

/// The payload a DynamoDB stream trigger hands to the function.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamEvent {
    pub records: Vec<MutationEvent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationEvent {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    pub event_name: EventKind,
    pub dynamodb: StreamRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
}

/// The `dynamodb` section of a stream record. Images depend on the stream's
/// view type, so all of them are optional here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default)]
    pub keys: Option<Image>,
    #[serde(default)]
    pub old_image: Option<Image>,
    #[serde(default)]
    pub new_image: Option<Image>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

impl StreamEvent {
    /// Parses a raw trigger payload, naming the offending field on failure.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        serde_json::from_value(value).map_err(|e| EventError::Malformed {
            reason: format!("invalid DynamoDB stream event: {e}"),
        })
    }
}

impl MutationEvent {
    /// A best-effort identifier for log lines and errors.
    pub fn describe(&self) -> String {
        self.event_id
            .clone()
            .or_else(|| self.dynamodb.sequence_number.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}
