//! Realtime speech session

use async_trait::async_trait;

use crate::Result;

/// Handle to the realtime speech/LLM session that voices the agent
///
/// Calls are ordered: a reply requested later is spoken after one requested
/// earlier. Implementations should fail fast once the session is torn down
/// rather than retry.
#[async_trait]
pub trait ReplySession: Send + Sync {
    /// Request the next spoken reply.
    ///
    /// With `None` the session decides the content from its ambient
    /// instructions and the conversation so far.
    async fn generate_reply(&self, instructions: Option<String>) -> Result<()>;
}
