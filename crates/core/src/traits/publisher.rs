//! Data channel publishing

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Outbound structured-message channel to the frontend
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish a JSON object. `reliable` requests ordered, acknowledged delivery.
    async fn publish(&self, payload: Value, reliable: bool) -> Result<()>;
}
