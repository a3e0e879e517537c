use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_firehose::Client;
use aws_sdk_firehose::error::DisplayErrorContext;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;
use tracing::debug;

use crate::errors::DeliveryError;
use crate::sink::{DeliverySink, PutBatchOutcome};

/// Delivers records to a Kinesis Data Firehose delivery stream.
pub struct FirehoseSink {
    client: Client,
    stream_name: String,
}

impl FirehoseSink {
    pub fn new(sdk_config: &SdkConfig, stream_name: impl Into<String>) -> Self {
        Self::from_client(Client::new(sdk_config), stream_name)
    }

    pub fn from_client(client: Client, stream_name: impl Into<String>) -> Self {
        Self {
            client,
            stream_name: stream_name.into(),
        }
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }
}

#[async_trait]
impl DeliverySink for FirehoseSink {
    async fn put_record_batch(
        &self,
        records: Vec<Vec<u8>>,
    ) -> Result<Option<PutBatchOutcome>, DeliveryError> {
        let records = records
            .into_iter()
            .map(|data| Record::builder().data(Blob::new(data)).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeliveryError::InvalidRecord {
                reason: e.to_string(),
            })?;

        let output = self
            .client
            .put_record_batch()
            .delivery_stream_name(&self.stream_name)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|e| DeliveryError::Request {
                stream: self.stream_name.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let failed_put_count = usize::try_from(output.failed_put_count()).unwrap_or(0);
        debug!(
            stream = %self.stream_name,
            failed_put_count,
            "PutRecordBatch completed"
        );

        Ok(Some(PutBatchOutcome { failed_put_count }))
    }
}
