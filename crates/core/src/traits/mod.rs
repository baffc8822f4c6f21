//! Traits for the external collaborators of the orchestrator
//!
//! ```text
//! Speech:
//!   - ReplySession: ask the realtime speech/LLM session to speak next
//!
//! Retrieval:
//!   - KnowledgeGateway: answer free-form questions from the knowledge base
//!
//! Frontend:
//!   - NotificationPublisher: push structured messages over the data channel
//! ```

mod knowledge;
mod publisher;
mod session;

pub use knowledge::KnowledgeGateway;
pub use publisher::NotificationPublisher;
pub use session::ReplySession;
