pub mod device_event;
pub mod dynamodb_stream;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A DynamoDB item image as the stream delivers it: attribute name to
/// attribute-value JSON (`{"S": "..."}`, `{"N": "..."}`, ...).
pub type Image = Map<String, Value>;

/// The pre-image of a removed row.
///
/// Kept opaque and serialized exactly as received so archived records keep
/// the stream's typed attribute encoding.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DeletedItem(Image);

impl DeletedItem {
    pub fn new(image: Image) -> Self {
        Self(image)
    }

    pub fn image(&self) -> &Image {
        &self.0
    }
}
