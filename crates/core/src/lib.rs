//! Core traits and types for the onboarding voice agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation stages and the canonical payment choices
//! - Decoding of structured control messages pushed by the frontend
//! - Outbound notification payloads
//! - Traits for the external collaborators (speech session, knowledge
//!   base, data channel)
//! - Error types

pub mod control;
pub mod error;
pub mod notification;
pub mod payment;
pub mod stage;
pub mod traits;

pub use control::{ControlDecodeError, ControlMessage};
pub use error::{Error, Result};
pub use notification::{FlowStatus, Notification};
pub use payment::PaymentChoice;
pub use stage::StageId;
pub use traits::{KnowledgeGateway, NotificationPublisher, ReplySession};
