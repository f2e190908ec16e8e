//! Click recorder
//!
//! Persists one click row per successful redirect. Recording is best effort:
//! a persistence failure becomes `Skipped` with a reason, never an error,
//! because the redirect must proceed regardless of attribution loss.

use tracing::debug;

use crate::services::ClassifiedRequest;
use crate::storage::SeaOrmStorage;

/// Result of one recording attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Skipped(String),
}

/// Record a click for `link_id`. The timestamp is assigned server-side at
/// capture time inside the storage layer.
pub async fn record_click(
    storage: &SeaOrmStorage,
    link_id: i64,
    request: &ClassifiedRequest,
) -> RecordOutcome {
    match storage.create_click(link_id, request).await {
        Ok(()) => {
            debug!(
                link_id,
                source = %request.source,
                device_type = %request.client.device_type,
                "Click recorded"
            );
            RecordOutcome::Recorded
        }
        Err(e) => RecordOutcome::Skipped(e.to_string()),
    }
}
