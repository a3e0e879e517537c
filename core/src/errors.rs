use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {path}: {error}")]
    LoadFailed {
        path: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Problems with the shape of an inbound trigger payload.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Malformed event: {reason}")]
    Malformed { reason: String },

    #[error("REMOVE event {event_id} carries no OldImage")]
    MissingOldImage { event_id: String },

    #[error("Timestamp {timestamp_ms}ms is out of range")]
    TimestampOutOfRange { timestamp_ms: i64 },
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("PutRecordBatch to {stream} failed: {reason}")]
    Request { stream: String, reason: String },

    #[error("Invalid delivery record: {reason}")]
    InvalidRecord { reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("PutItem to {table} failed: {reason}")]
    Request { table: String, reason: String },

    #[error("Failed to convert item attribute {attribute}: {reason}")]
    Conversion { attribute: String, reason: String },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for RelayError {
    fn from(err: serde_yaml::Error) -> Self {
        RelayError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl RelayError {
    /// Whether replaying the same trigger input could succeed.
    ///
    /// The Lambda trigger owns redelivery; this only classifies the failure
    /// for logging.
    pub fn is_retryable(&self) -> bool {
        match self {
            RelayError::Delivery(DeliveryError::Request { .. }) => true,
            RelayError::Store(StoreError::Request { .. }) => true,
            RelayError::Config(_) => false,
            RelayError::Event(_) => false,
            RelayError::Serialization(_) => false,
            RelayError::Delivery(DeliveryError::InvalidRecord { .. }) => false,
            RelayError::Store(StoreError::Conversion { .. }) => false,
        }
    }
}
