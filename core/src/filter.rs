use tracing::{info, warn};

use crate::config::MissingImagePolicy;
use crate::errors::EventError;
use crate::source::DeletedItem;
use crate::source::dynamodb_stream::{EventKind, MutationEvent};

/// The result of filtering one stream batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Pre-images of REMOVE events, in input order.
    pub items: Vec<DeletedItem>,
    /// REMOVE events dropped because they had no pre-image.
    pub skipped: usize,
}

/// Keeps the pre-images of REMOVE events and drops everything else.
///
/// Order is preserved. A REMOVE without an `OldImage` fails the whole batch
/// under [`MissingImagePolicy::Fail`] and is counted in `skipped` under
/// [`MissingImagePolicy::Skip`].
pub fn removed_items(
    events: Vec<MutationEvent>,
    policy: MissingImagePolicy,
) -> Result<FilterOutcome, EventError> {
    info!(records = events.len(), "Received stream records");

    let mut outcome = FilterOutcome::default();
    for event in events {
        if event.event_name != EventKind::Remove {
            continue;
        }

        let event_id = event.describe();
        match (event.dynamodb.old_image, policy) {
            (Some(image), _) => outcome.items.push(DeletedItem::new(image)),
            (None, MissingImagePolicy::Fail) => {
                return Err(EventError::MissingOldImage { event_id });
            }
            (None, MissingImagePolicy::Skip) => {
                warn!(event_id = %event_id, "Skipping REMOVE event without OldImage");
                outcome.skipped += 1;
            }
        }
    }

    info!(
        removed = outcome.items.len(),
        skipped = outcome.skipped,
        "Handling removed items"
    );
    Ok(outcome)
}
