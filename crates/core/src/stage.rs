//! Conversation stages
//!
//! The onboarding call moves through a fixed script of stages. Frontends and
//! older clients may still send the first-generation stage names
//! (`introduction`, `payment`); those parse to their current equivalents.
//! Anything else is kept verbatim so an unknown stage can be stored and
//! reported without ever producing guidance.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the scripted onboarding conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StageId {
    /// Greeting and rapport building
    #[default]
    Greeting,
    /// Explaining the ways to pay the program fee
    PaymentOptions,
    /// Choosing an NBFC partner for the EMI loan
    NbfcSelection,
    /// Document collection for the loan
    Kyc,
    /// Understanding why the family is hesitating
    Rca,
    /// Conversation concluded
    Completed,
    /// Identifier not known to this build, kept verbatim
    Other(String),
}

impl StageId {
    /// Every stage the catalog knows about, in script order
    pub const CANONICAL: [StageId; 6] = [
        StageId::Greeting,
        StageId::PaymentOptions,
        StageId::NbfcSelection,
        StageId::Kyc,
        StageId::Rca,
        StageId::Completed,
    ];

    /// Parse a stage identifier, mapping legacy names and aliases
    ///
    /// Matching is exact; anything unrecognized is kept byte for byte.
    pub fn parse(id: &str) -> Self {
        match id {
            "greeting" | "introduction" => StageId::Greeting,
            "payment_options" | "payment" => StageId::PaymentOptions,
            "nbfc_selection" => StageId::NbfcSelection,
            "kyc" => StageId::Kyc,
            "rca" => StageId::Rca,
            "completed" | "flow_complete" => StageId::Completed,
            other => StageId::Other(other.to_string()),
        }
    }

    /// Wire identifier for this stage
    pub fn as_str(&self) -> &str {
        match self {
            StageId::Greeting => "greeting",
            StageId::PaymentOptions => "payment_options",
            StageId::NbfcSelection => "nbfc_selection",
            StageId::Kyc => "kyc",
            StageId::Rca => "rca",
            StageId::Completed => "completed",
            StageId::Other(id) => id,
        }
    }

    /// Terminal stages never receive further guidance
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageId::Completed)
    }

    /// Whether the identifier was recognized
    pub fn is_known(&self) -> bool {
        !matches!(self, StageId::Other(_))
    }

    /// Human readable name for logs and prompts
    pub fn display_name(&self) -> &str {
        match self {
            StageId::Greeting => "Greeting",
            StageId::PaymentOptions => "Payment Options",
            StageId::NbfcSelection => "NBFC Selection",
            StageId::Kyc => "KYC",
            StageId::Rca => "RCA",
            StageId::Completed => "Completed",
            StageId::Other(id) => id,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for StageId {
    fn from(id: String) -> Self {
        StageId::parse(&id)
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        StageId::parse(id)
    }
}

impl From<StageId> for String {
    fn from(stage: StageId) -> Self {
        stage.as_str().to_string()
    }
}
