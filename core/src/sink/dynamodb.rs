use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use rust_decimal::Decimal;

use crate::errors::StoreError;
use crate::sink::{StoredItem, TableStore};

/// Writes items to a DynamoDB table.
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(sdk_config: &SdkConfig, table_name: impl Into<String>) -> Self {
        Self::from_client(Client::new(sdk_config), table_name)
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Decimals become `N` attributes in their normalized string form so no
/// binary float ever touches them.
fn number(value: Decimal) -> AttributeValue {
    AttributeValue::N(value.normalize().to_string())
}

/// Converts a stored item into the attribute map `PutItem` expects.
pub fn to_attributes(item: StoredItem) -> Result<HashMap<String, AttributeValue>, StoreError> {
    let payload: AttributeValue =
        serde_dynamo::to_attribute_value(&item.payload).map_err(|e| StoreError::Conversion {
            attribute: "payload".to_string(),
            reason: e.to_string(),
        })?;

    Ok(HashMap::from([
        ("device".to_string(), AttributeValue::S(item.device)),
        ("timestamp".to_string(), number(item.timestamp)),
        ("ttl".to_string(), number(item.ttl)),
        ("payload".to_string(), payload),
    ]))
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn put_item(&self, item: StoredItem) -> Result<(), StoreError> {
        let attributes = to_attributes(item)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(attributes))
            .send()
            .await
            .map_err(|e| StoreError::Request {
                table: self.table_name.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
