//! Error types shared by the collaborator traits

use thiserror::Error;

/// Errors raised by the external collaborators of the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    /// The realtime speech session rejected or failed a reply request
    #[error("Reply dispatch failed: {0}")]
    Reply(String),

    /// The data channel failed to deliver a notification
    #[error("Publish failed: {0}")]
    Publish(String),

    /// The knowledge base lookup failed or timed out
    #[error("Knowledge lookup failed: {0}")]
    Knowledge(String),

    /// The session was torn down while a call was in flight
    #[error("Session closed")]
    SessionClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
