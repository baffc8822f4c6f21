//! JSON-lines call scripts
//!
//! ```text
//! {"event":"start","session":"call-1"}
//! {"event":"turn_completed","session":"call-1","transcript":"Hello"}
//! {"event":"data_received","session":"call-1","payload":{"stage":"kyc"}}
//! {"event":"end","session":"call-1"}
//! ```
//!
//! `session` may be omitted, in which case the runner's default session is
//! used. Blank lines and lines starting with `#` are skipped. A string
//! `payload` is passed through as raw bytes, anything else is re-encoded as
//! JSON.

use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::session::SessionManager;
use crate::WorkerError;

const DEFAULT_PARTICIPANT: &str = "frontend";

/// One inbound call event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    Start {
        #[serde(default)]
        session: Option<String>,
    },
    TurnCompleted {
        #[serde(default)]
        session: Option<String>,
        transcript: String,
    },
    DataReceived {
        #[serde(default)]
        session: Option<String>,
        #[serde(default = "default_participant")]
        participant: String,
        payload: Value,
    },
    End {
        #[serde(default)]
        session: Option<String>,
    },
}

fn default_participant() -> String {
    DEFAULT_PARTICIPANT.to_string()
}

impl InboundEvent {
    /// Parse one script line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>, WorkerError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| WorkerError::InvalidEvent {
                line: line_no,
                message: e.to_string(),
            })
    }

    /// Session id carried by the event, if any
    pub fn session(&self) -> Option<&str> {
        match self {
            InboundEvent::Start { session }
            | InboundEvent::TurnCompleted { session, .. }
            | InboundEvent::DataReceived { session, .. }
            | InboundEvent::End { session } => session.as_deref(),
        }
    }
}

/// Bytes delivered to the orchestrator for a data-channel payload
pub fn payload_bytes(payload: &Value) -> Vec<u8> {
    match payload {
        Value::String(raw) => raw.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

/// Counts from one script run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub events: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Feed every event from `reader` to the session manager
///
/// Bad lines and rejected events are logged and counted; the run continues.
pub async fn run_script<R>(
    reader: R,
    manager: &SessionManager,
    default_session: &str,
) -> Result<ScriptSummary, WorkerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ScriptSummary::default();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let event = match InboundEvent::parse_line(&line, line_no) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping script line");
                summary.skipped += 1;
                continue;
            },
        };

        let session = event.session().unwrap_or(default_session).to_string();
        let result = match &event {
            InboundEvent::Start { .. } => manager.start(&session).await.map(|_| ()),
            InboundEvent::TurnCompleted { transcript, .. } => manager
                .turn_completed(&session, transcript)
                .await
                .map(|outcome| {
                    tracing::debug!(session_id = %session, ?outcome, "Turn handled");
                }),
            InboundEvent::DataReceived {
                participant,
                payload,
                ..
            } => manager
                .data_received(&session, &payload_bytes(payload), participant)
                .await
                .map(|outcome| {
                    tracing::debug!(session_id = %session, ?outcome, "Data handled");
                }),
            InboundEvent::End { .. } => {
                if !manager.end(&session) {
                    tracing::warn!(session_id = %session, "End for unknown session");
                }
                Ok(())
            },
        };

        summary.events += 1;
        if let Err(e) = result {
            summary.failed += 1;
            tracing::error!(session_id = %session, line = line_no, error = %e, "Event failed");
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_turn_completed() {
        let event = InboundEvent::parse_line(
            r#"{"event":"turn_completed","session":"a","transcript":"full payment"}"#,
            1,
        )
        .unwrap();
        assert_eq!(
            event,
            Some(InboundEvent::TurnCompleted {
                session: Some("a".to_string()),
                transcript: "full payment".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_data_received_defaults() {
        let event = InboundEvent::parse_line(
            r#"{"event":"data_received","payload":{"action":"force_reply"}}"#,
            1,
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.session(), None);
        match event {
            InboundEvent::DataReceived {
                participant,
                payload,
                ..
            } => {
                assert_eq!(participant, "frontend");
                assert_eq!(payload, json!({"action": "force_reply"}));
            },
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_skip_blank_and_comment_lines() {
        assert_eq!(InboundEvent::parse_line("   ", 1).unwrap(), None);
        assert_eq!(InboundEvent::parse_line("# greeting", 2).unwrap(), None);
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let err = InboundEvent::parse_line(r#"{"event":"dance"}"#, 7).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidEvent { line: 7, .. }));
    }

    #[test]
    fn test_payload_bytes() {
        assert_eq!(payload_bytes(&json!("not json")), b"not json".to_vec());
        assert_eq!(payload_bytes(&json!({"stage": "kyc"})), br#"{"stage":"kyc"}"#.to_vec());
    }
}
