//! Structured control messages from the frontend
//!
//! The frontend pushes small JSON objects over the data channel. Shapes are
//! mutually exclusive and checked in a fixed precedence order:
//!
//! 1. `{"action": "force_reply"}`
//! 2. `{"type": "payment_option.selected", "choice", "next_stage", "agent_message"}`
//! 3. `{"stage": "<stage id>"}`
//! 4. `{"payment_choice": "<raw token>", "choice_title"?}`

use serde_json::{Map, Value};
use thiserror::Error;

use crate::stage::StageId;

const FORCE_REPLY_ACTION: &str = "force_reply";
const PAYMENT_OPTION_SELECTED: &str = "payment_option.selected";

/// A recognized control message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// Re-engage the participant without changing state
    ForceReply,
    /// Explicit transition directive from the frontend
    PaymentOptionSelected {
        choice: Option<String>,
        next_stage: Option<String>,
        agent_message: Option<String>,
    },
    /// Direct stage override
    SetStage(StageId),
    /// Raw payment choice needing normalization
    PaymentChoice {
        raw: String,
        title: Option<String>,
    },
}

/// Payload could not be decoded into a JSON object
#[derive(Error, Debug)]
pub enum ControlDecodeError {
    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is not a JSON object")]
    NotAnObject,
}

impl ControlMessage {
    /// Decode raw data-channel bytes.
    ///
    /// Returns `Ok(None)` for well-formed objects that match no known shape.
    pub fn decode(data: &[u8]) -> Result<Option<Self>, ControlDecodeError> {
        let text = std::str::from_utf8(data)?;
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(map) => Ok(Self::from_object(&map)),
            _ => Err(ControlDecodeError::NotAnObject),
        }
    }

    /// Match a decoded object against the known shapes
    pub fn from_object(map: &Map<String, Value>) -> Option<Self> {
        if str_field(map, "action") == Some(FORCE_REPLY_ACTION) {
            return Some(ControlMessage::ForceReply);
        }

        if str_field(map, "type") == Some(PAYMENT_OPTION_SELECTED) {
            return Some(ControlMessage::PaymentOptionSelected {
                choice: owned_field(map, "choice"),
                next_stage: verbatim_field(map, "next_stage"),
                agent_message: owned_field(map, "agent_message"),
            });
        }

        if let Some(stage) = str_field(map, "stage") {
            return Some(ControlMessage::SetStage(StageId::parse(stage)));
        }

        if let Some(raw) = str_field(map, "payment_choice") {
            return Some(ControlMessage::PaymentChoice {
                raw: raw.to_string(),
                title: owned_field(map, "choice_title"),
            });
        }

        None
    }

    /// Short name for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ControlMessage::ForceReply => "force_reply",
            ControlMessage::PaymentOptionSelected { .. } => "payment_option_selected",
            ControlMessage::SetStage(_) => "stage",
            ControlMessage::PaymentChoice { .. } => "payment_choice",
        }
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Non-blank string field, untrimmed
fn verbatim_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    str_field(map, key)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Non-empty string field, trimmed
fn owned_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    str_field(map, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Option<ControlMessage> {
        ControlMessage::decode(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_force_reply() {
        assert_eq!(
            decode(r#"{"action":"force_reply"}"#),
            Some(ControlMessage::ForceReply)
        );
        assert_eq!(decode(r#"{"action":"other"}"#), None);
    }

    #[test]
    fn test_payment_option_selected() {
        let msg = decode(
            r#"{"type":"payment_option.selected","choice":"nbfc-emi","next_stage":"flow_complete","agent_message":"Thanks"}"#,
        );
        assert_eq!(
            msg,
            Some(ControlMessage::PaymentOptionSelected {
                choice: Some("nbfc-emi".to_string()),
                next_stage: Some("flow_complete".to_string()),
                agent_message: Some("Thanks".to_string()),
            })
        );
    }

    #[test]
    fn test_payment_option_selected_blank_fields() {
        let msg = decode(r#"{"type":"payment_option.selected","choice":"full-payment","agent_message":"  "}"#);
        assert_eq!(
            msg,
            Some(ControlMessage::PaymentOptionSelected {
                choice: Some("full-payment".to_string()),
                next_stage: None,
                agent_message: None,
            })
        );
    }

    #[test]
    fn test_stage_override() {
        assert_eq!(
            decode(r#"{"stage":"kyc"}"#),
            Some(ControlMessage::SetStage(StageId::Kyc))
        );
        assert_eq!(
            decode(r#"{"stage":"introduction"}"#),
            Some(ControlMessage::SetStage(StageId::Greeting))
        );
    }

    #[test]
    fn test_unknown_stage_ids_are_not_trimmed() {
        assert_eq!(
            decode(r#"{"stage":" foo "}"#),
            Some(ControlMessage::SetStage(StageId::Other(" foo ".to_string())))
        );
        assert_eq!(
            decode(r#"{"type":"payment_option.selected","next_stage":" kyc "}"#),
            Some(ControlMessage::PaymentOptionSelected {
                choice: None,
                next_stage: Some(" kyc ".to_string()),
                agent_message: None,
            })
        );
    }

    #[test]
    fn test_payment_choice() {
        assert_eq!(
            decode(r#"{"payment_choice":"credit-card","choice_title":"Credit Card"}"#),
            Some(ControlMessage::PaymentChoice {
                raw: "credit-card".to_string(),
                title: Some("Credit Card".to_string()),
            })
        );
    }

    #[test]
    fn test_precedence() {
        // force_reply beats everything else in the same object
        assert_eq!(
            decode(r#"{"action":"force_reply","stage":"kyc","payment_choice":"nbfc-emi"}"#),
            Some(ControlMessage::ForceReply)
        );
        // stage beats payment_choice
        assert_eq!(
            decode(r#"{"stage":"rca","payment_choice":"nbfc-emi"}"#),
            Some(ControlMessage::SetStage(StageId::Rca))
        );
    }

    #[test]
    fn test_unrecognized_object() {
        assert_eq!(decode(r#"{"hello":"world"}"#), None);
        assert_eq!(decode(r#"{"stage":42}"#), None);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            ControlMessage::decode(b"not json"),
            Err(ControlDecodeError::Json(_))
        ));
        assert!(matches!(
            ControlMessage::decode(&[0xff, 0xfe]),
            Err(ControlDecodeError::Utf8(_))
        ));
        assert!(matches!(
            ControlMessage::decode(b"[1,2,3]"),
            Err(ControlDecodeError::NotAnObject)
        ));
    }
}
