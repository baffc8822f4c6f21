//! Event handler trait registered with the transport
//!
//! The transport layer owns one handler per session and calls it for every
//! inbound event, one event at a time. Handlers take `&mut self`, so a
//! session's events can never be processed concurrently.

use async_trait::async_trait;

use crate::orchestrator::EventOutcome;

#[async_trait]
pub trait ConversationHandler: Send {
    /// The participant finished speaking
    async fn on_turn_completed(&mut self, transcript: &str) -> EventOutcome;

    /// A structured message arrived over the data channel
    async fn on_data_received(&mut self, data: &[u8], participant_identity: &str) -> EventOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that the trait is object-safe
    fn _assert_handler_object_safe(_: &dyn ConversationHandler) {}
}
