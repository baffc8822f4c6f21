//! Knowledge base lookups

use async_trait::async_trait;

use crate::Result;

/// Question answering over the program knowledge base
///
/// Timeouts are the implementation's responsibility. Any error is treated by
/// callers as "no answer available".
#[async_trait]
pub trait KnowledgeGateway: Send + Sync {
    /// Return retrieved text relevant to `text`
    async fn query(&self, text: &str) -> Result<String>;

    /// Gateway name for logging
    fn name(&self) -> &str {
        "knowledge"
    }
}
