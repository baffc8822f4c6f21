//! Outbound notifications for the frontend
//!
//! Published over the reliable data channel whenever the conversation
//! advances or ends. Delivery is at-least-once; the frontend must tolerate
//! duplicates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payment::PaymentChoice;
use crate::stage::StageId;

/// Flow status carried by the end notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Ended,
}

/// Structured notification payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// The conversation reached its terminal stage
    #[serde(rename = "flow.ended")]
    Ended {
        status: FlowStatus,
        stage: StageId,
        #[serde(skip_serializing_if = "Option::is_none")]
        payment_choice: Option<PaymentChoice>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The conversation moved to a new stage
    #[serde(rename = "stage.advanced")]
    StageAdvanced {
        advance_stage: bool,
        stage: StageId,
        #[serde(skip_serializing_if = "Option::is_none")]
        payment_choice: Option<PaymentChoice>,
    },
}

impl Notification {
    pub fn ended(
        stage: StageId,
        payment_choice: Option<PaymentChoice>,
        message: Option<String>,
    ) -> Self {
        Notification::Ended {
            status: FlowStatus::Ended,
            stage,
            payment_choice,
            message,
        }
    }

    pub fn stage_advanced(stage: StageId, payment_choice: Option<PaymentChoice>) -> Self {
        Notification::StageAdvanced {
            advance_stage: true,
            stage,
            payment_choice,
        }
    }

    /// Short name for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Ended { .. } => "ended",
            Notification::StageAdvanced { .. } => "stage_advanced",
        }
    }

    /// JSON object handed to the data channel
    pub fn to_payload(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
