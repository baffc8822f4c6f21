//! Console stand-in for the realtime speech session and the data channel
//!
//! Outbound effects are queued on an unbounded channel; a single writer task
//! drains it so lines from concurrent sessions never interleave.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use onboarding_agent_core::{Error, NotificationPublisher, ReplySession, Result};

/// One line of worker output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// The speech session was asked to speak
    Reply {
        session: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
    },
    /// A notification was published to the frontend
    Notification {
        session: String,
        reliable: bool,
        payload: Value,
    },
}

impl OutboundEvent {
    pub fn session(&self) -> &str {
        match self {
            OutboundEvent::Reply { session, .. } | OutboundEvent::Notification { session, .. } => {
                session
            },
        }
    }
}

/// Reply session and publisher for one console call
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    session_id: String,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
}

impl ConsoleSession {
    pub fn new(session_id: impl Into<String>, outbound: mpsc::UnboundedSender<OutboundEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            outbound,
        }
    }
}

#[async_trait]
impl ReplySession for ConsoleSession {
    async fn generate_reply(&self, instructions: Option<String>) -> Result<()> {
        self.outbound
            .send(OutboundEvent::Reply {
                session: self.session_id.clone(),
                instructions,
            })
            .map_err(|_| Error::SessionClosed)
    }
}

#[async_trait]
impl NotificationPublisher for ConsoleSession {
    async fn publish(&self, payload: Value, reliable: bool) -> Result<()> {
        self.outbound
            .send(OutboundEvent::Notification {
                session: self.session_id.clone(),
                reliable,
                payload,
            })
            .map_err(|_| Error::Publish("console output closed".to_string()))
    }
}
