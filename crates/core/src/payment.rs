//! Payment choice normalization
//!
//! A family can pick a payment method either by saying it out loud or by
//! tapping a button on the frontend. Both arrive as raw text and are reduced
//! to one of three canonical choices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical payment choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChoice {
    CreditCard,
    FullPayment,
    NbfcEmi,
}

/// Frontend button ids, matched exactly
const BUTTON_TOKENS: &[(&str, PaymentChoice)] = &[
    ("credit-card", PaymentChoice::CreditCard),
    ("credit-card-emi", PaymentChoice::CreditCard),
    ("full-payment", PaymentChoice::FullPayment),
    ("nbfc-emi", PaymentChoice::NbfcEmi),
    ("0%-interest-loan-with-nbfc-(emi)", PaymentChoice::NbfcEmi),
];

/// Spoken keywords, in precedence order. The first group with any keyword
/// contained in the lower-cased utterance wins.
const SPOKEN_KEYWORDS: &[(PaymentChoice, &[&str])] = &[
    (PaymentChoice::CreditCard, &["credit card", "credit", "card"]),
    (
        PaymentChoice::FullPayment,
        &["full payment", "full", "upfront", "one time"],
    ),
    (
        PaymentChoice::NbfcEmi,
        &["emi", "loan", "nbfc", "installment", "monthly"],
    ),
];

impl PaymentChoice {
    /// Map a raw token or utterance to a canonical choice
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some((_, choice)) = BUTTON_TOKENS.iter().find(|(token, _)| *token == trimmed) {
            return Some(*choice);
        }

        let spoken = trimmed.to_lowercase();
        SPOKEN_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| spoken.contains(kw)))
            .map(|(choice, _)| *choice)
    }

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChoice::CreditCard => "credit_card",
            PaymentChoice::FullPayment => "full_payment",
            PaymentChoice::NbfcEmi => "nbfc_emi",
        }
    }

    /// Choices settled directly with a human counsellor end the call
    pub fn ends_flow(&self) -> bool {
        matches!(self, PaymentChoice::CreditCard | PaymentChoice::FullPayment)
    }

    /// Spoken label used inside prompts
    pub fn label(&self) -> &'static str {
        match self {
            PaymentChoice::CreditCard => "credit card",
            PaymentChoice::FullPayment => "full upfront payment",
            PaymentChoice::NbfcEmi => "0% interest EMI loan through an NBFC partner",
        }
    }
}

impl fmt::Display for PaymentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
