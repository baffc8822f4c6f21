//! Orchestrator metrics
//!
//! Counters are recorded through the `metrics` facade; the binary decides
//! which recorder (if any) is installed.

use metrics::counter;
use onboarding_agent_core::StageId;

pub const REPLIES_TOTAL: &str = "onboarding_replies_total";
pub const REPLY_FAILURES_TOTAL: &str = "onboarding_reply_failures_total";
pub const NOTIFICATIONS_TOTAL: &str = "onboarding_notifications_total";
pub const NOTIFICATION_FAILURES_TOTAL: &str = "onboarding_notification_failures_total";
pub const KNOWLEDGE_LOOKUPS_TOTAL: &str = "onboarding_knowledge_lookups_total";
pub const CONTROL_MESSAGES_TOTAL: &str = "onboarding_control_messages_total";
pub const STAGE_TRANSITIONS_TOTAL: &str = "onboarding_stage_transitions_total";

pub fn record_reply(kind: &'static str) {
    counter!(REPLIES_TOTAL, "kind" => kind).increment(1);
}

pub fn record_reply_failure(kind: &'static str) {
    counter!(REPLY_FAILURES_TOTAL, "kind" => kind).increment(1);
}

pub fn record_notification(kind: &'static str) {
    counter!(NOTIFICATIONS_TOTAL, "kind" => kind).increment(1);
}

pub fn record_notification_failure(kind: &'static str) {
    counter!(NOTIFICATION_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// `outcome` is one of `answered`, `failed`
pub fn record_knowledge_lookup(outcome: &'static str) {
    counter!(KNOWLEDGE_LOOKUPS_TOTAL, "outcome" => outcome).increment(1);
}

/// `kind` is the message kind, or `malformed` / `unrecognized`
pub fn record_control_message(kind: &'static str) {
    counter!(CONTROL_MESSAGES_TOTAL, "kind" => kind).increment(1);
}

/// Unknown stages share one label
pub fn record_stage_transition(to: &StageId) {
    let label = if to.is_known() {
        to.as_str().to_string()
    } else {
        "other".to_string()
    };
    counter!(STAGE_TRANSITIONS_TOTAL, "to" => label).increment(1);
}
