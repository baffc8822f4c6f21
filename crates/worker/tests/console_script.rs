//! Scripted console runs through the session manager

use serde_json::Value;
use tokio::sync::mpsc;

use onboarding_agent_agent::{OrchestratorFactory, PromptBuilder, StageCatalog};
use onboarding_agent_core::StageId;
use onboarding_agent_worker::{run_script, OutboundEvent, ScriptSummary, SessionManager};

fn manager(max_sessions: usize) -> (SessionManager, mpsc::UnboundedReceiver<OutboundEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let factory = OrchestratorFactory::new(StageCatalog::builtin(), PromptBuilder::default());
    (SessionManager::new(factory, tx, max_sessions), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn notifications(events: &[OutboundEvent]) -> Vec<Value> {
    events
        .iter()
        .filter_map(|e| match e {
            OutboundEvent::Notification { payload, .. } => Some(payload.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_full_payment_script() {
    let (manager, mut rx) = manager(8);
    let script = br#"
# parent picks full payment
{"event":"start","session":"call-1"}
{"event":"turn_completed","session":"call-1","transcript":"Hello"}
{"event":"data_received","session":"call-1","payload":{"stage":"payment_options"}}
{"event":"turn_completed","session":"call-1","transcript":"We will do the full payment"}
"#;

    let summary = run_script(&script[..], &manager, "unused").await.unwrap();

    assert_eq!(
        summary,
        ScriptSummary {
            events: 4,
            skipped: 0,
            failed: 0
        }
    );
    assert_eq!(manager.stage("call-1").await.unwrap(), StageId::Completed);

    let events = drain(&mut rx);
    // greeting, default reply, payment guidance, handoff, ended notification
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.session() == "call-1"));
    let ended = notifications(&events);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0]["status"], "ended");
    assert_eq!(ended[0]["payment_choice"], "full_payment");
}

#[tokio::test]
async fn test_default_session_and_raw_payload() {
    let (manager, mut rx) = manager(8);
    let script = br#"
{"event":"data_received","payload":"{\"stage\":\"kyc\"}"}
{"event":"data_received","payload":"definitely not json"}
"#;

    let summary = run_script(&script[..], &manager, "console").await.unwrap();

    assert_eq!(summary.events, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(manager.stage("console").await.unwrap(), StageId::Kyc);
    // greeting and kyc guidance; the malformed payload is dropped
    assert_eq!(drain(&mut rx).len(), 2);
}

#[tokio::test]
async fn test_bad_lines_are_skipped() {
    let (manager, _rx) = manager(8);
    let script = br#"
not an event
{"event":"teleport","session":"a"}
{"event":"turn_completed","session":"a","transcript":"hi"}
"#;

    let summary = run_script(&script[..], &manager, "default").await.unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.events, 1);
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_end_discards_session() {
    let (manager, _rx) = manager(8);
    let script = br#"
{"event":"start","session":"a"}
{"event":"end","session":"a"}
{"event":"end","session":"a"}
"#;

    let summary = run_script(&script[..], &manager, "default").await.unwrap();

    assert_eq!(summary.events, 3);
    assert!(manager.is_empty());
}

#[tokio::test]
async fn test_session_limit_counts_as_failure() {
    let (manager, _rx) = manager(1);
    let script = br#"
{"event":"start","session":"a"}
{"event":"start","session":"b"}
{"event":"turn_completed","session":"b","transcript":"hello?"}
"#;

    let summary = run_script(&script[..], &manager, "default").await.unwrap();

    assert_eq!(summary.events, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_interleaved_calls_stay_separate() {
    let (manager, mut rx) = manager(8);
    let script = br#"
{"event":"data_received","session":"a","payload":{"stage":"payment_options"}}
{"event":"data_received","session":"b","payload":{"stage":"payment_options"}}
{"event":"turn_completed","session":"a","transcript":"nbfc emi please"}
{"event":"turn_completed","session":"b","transcript":"credit card"}
"#;

    run_script(&script[..], &manager, "default").await.unwrap();

    assert_eq!(manager.stage("a").await.unwrap(), StageId::NbfcSelection);
    assert_eq!(manager.stage("b").await.unwrap(), StageId::Completed);

    let events = drain(&mut rx);
    let a: Vec<Value> = notifications(
        &events
            .iter()
            .filter(|e| e.session() == "a")
            .cloned()
            .collect::<Vec<_>>(),
    );
    assert_eq!(a.len(), 1);
    assert_eq!(a[0]["advance_stage"], true);
}
