use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber. CloudWatch stamps each line, so the
/// formatter omits its own timestamp.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Counters for one archive-deleted invocation, returned as its response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RelayMetrics {
    pub records_received: usize,
    pub removed_items: usize,
    pub skipped_items: usize,
    pub batches_sent: usize,
    /// Bytes handed to the sink, including records it reported as failed.
    pub bytes_submitted: u64,
    pub failed_put_count: usize,
}
