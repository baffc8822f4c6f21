//! Session registry
//!
//! Each call gets its own orchestrator behind its own async mutex, so events
//! for one call are handled strictly in order while separate calls never
//! wait on each other. The registry lock is never held across an await.
//! No event reaches an orchestrator before its greeting has been sent.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, MutexGuard, OnceCell};

use onboarding_agent_agent::{
    AgentError, ConversationHandler, EventOutcome, OrchestratorFactory, StageOrchestrator,
};
use onboarding_agent_core::StageId;

use crate::console::{ConsoleSession, OutboundEvent};
use crate::WorkerError;

/// One active call
pub struct Session {
    orchestrator: Mutex<StageOrchestrator>,
    greeted: OnceCell<()>,
}

impl Session {
    fn new(orchestrator: StageOrchestrator) -> Self {
        Self {
            orchestrator: Mutex::new(orchestrator),
            greeted: OnceCell::new(),
        }
    }

    /// Send the greeting once; concurrent callers wait for it to finish
    async fn ensure_greeted(&self) -> Result<(), AgentError> {
        self.greeted
            .get_or_try_init(|| async { self.orchestrator.lock().await.start().await })
            .await
            .map(|_| ())
    }

    pub fn is_greeted(&self) -> bool {
        self.greeted.initialized()
    }

    /// Exclusive access to the call's orchestrator
    pub async fn lock(&self) -> MutexGuard<'_, StageOrchestrator> {
        self.orchestrator.lock().await
    }
}

type SessionHandle = Arc<Session>;

/// Manages active calls
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    factory: OrchestratorFactory,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(
        factory: OrchestratorFactory,
        outbound: mpsc::UnboundedSender<OutboundEvent>,
        max_sessions: usize,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            factory,
            outbound,
            max_sessions,
        }
    }

    /// Start a call and greet the participant
    ///
    /// Starting a call that is already active returns the existing session
    /// once its greeting has gone out.
    pub async fn start(&self, session_id: &str) -> Result<SessionHandle, WorkerError> {
        let handle = {
            let mut sessions = self.sessions.write();
            if let Some(existing) = sessions.get(session_id) {
                Arc::clone(existing)
            } else if sessions.len() >= self.max_sessions {
                tracing::warn!(
                    session_id,
                    max_sessions = self.max_sessions,
                    "Rejecting call, session limit reached"
                );
                return Err(WorkerError::SessionLimit(self.max_sessions));
            } else {
                let console = Arc::new(ConsoleSession::new(session_id, self.outbound.clone()));
                let orchestrator = self.factory.create(session_id, console.clone(), console);
                let handle = Arc::new(Session::new(orchestrator));
                sessions.insert(session_id.to_string(), Arc::clone(&handle));
                metrics::gauge!("onboarding_active_sessions").set(sessions.len() as f64);
                tracing::info!(session_id, "Session created");
                handle
            }
        };

        if let Err(e) = handle.ensure_greeted().await {
            self.end(session_id);
            return Err(e.into());
        }
        Ok(handle)
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Route a completed turn, starting the call first if needed
    pub async fn turn_completed(
        &self,
        session_id: &str,
        transcript: &str,
    ) -> Result<EventOutcome, WorkerError> {
        let handle = self.start(session_id).await?;
        let mut orchestrator = handle.lock().await;
        Ok(orchestrator.on_turn_completed(transcript).await)
    }

    /// Route a data-channel message, starting the call first if needed
    pub async fn data_received(
        &self,
        session_id: &str,
        data: &[u8],
        participant_identity: &str,
    ) -> Result<EventOutcome, WorkerError> {
        let handle = self.start(session_id).await?;
        let mut orchestrator = handle.lock().await;
        Ok(orchestrator.on_data_received(data, participant_identity).await)
    }

    /// Current stage of an active call
    pub async fn stage(&self, session_id: &str) -> Result<StageId, WorkerError> {
        let handle = self
            .get(session_id)
            .ok_or_else(|| WorkerError::SessionNotFound(session_id.to_string()))?;
        let orchestrator = handle.lock().await;
        Ok(orchestrator.stage().clone())
    }

    /// Discard a call. Returns whether it was active.
    pub fn end(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write();
        let removed = sessions.remove(session_id).is_some();
        metrics::gauge!("onboarding_active_sessions").set(sessions.len() as f64);
        if removed {
            tracing::info!(session_id, "Session ended");
        }
        removed
    }

    /// Discard every call
    pub fn end_all(&self) -> usize {
        let mut sessions = self.sessions.write();
        let count = sessions.len();
        sessions.clear();
        metrics::gauge!("onboarding_active_sessions").set(0.0);
        count
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboarding_agent_agent::{PromptBuilder, StageCatalog};

    fn manager(max_sessions: usize) -> (SessionManager, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let factory = OrchestratorFactory::new(StageCatalog::builtin(), PromptBuilder::default());
        (SessionManager::new(factory, tx, max_sessions), rx)
    }

    #[tokio::test]
    async fn test_start_greets_once() {
        let (manager, mut rx) = manager(4);

        manager.start("a").await.unwrap();
        manager.start("a").await.unwrap();

        assert_eq!(manager.len(), 1);
        assert!(matches!(rx.try_recv(), Ok(OutboundEvent::Reply { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_session_limit() {
        let (manager, _rx) = manager(1);

        manager.start("a").await.unwrap();
        assert!(matches!(
            manager.start("b").await,
            Err(WorkerError::SessionLimit(1))
        ));

        assert!(manager.end("a"));
        assert!(manager.start("b").await.is_ok());
    }

    #[tokio::test]
    async fn test_events_start_unknown_session() {
        let (manager, _rx) = manager(4);

        let outcome = manager
            .data_received("a", br#"{"stage":"payment_options"}"#, "frontend")
            .await
            .unwrap();
        assert_eq!(outcome, EventOutcome::StageSet(StageId::PaymentOptions));

        let outcome = manager.turn_completed("a", "full payment").await.unwrap();
        assert!(matches!(outcome, EventOutcome::PaymentSelected(_)));
        assert_eq!(manager.stage("a").await.unwrap(), StageId::Completed);
    }

    #[tokio::test]
    async fn test_end_unknown_session() {
        let (manager, _rx) = manager(4);
        assert!(!manager.end("missing"));
        assert!(matches!(
            manager.stage("missing").await,
            Err(WorkerError::SessionNotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_greeting_precedes_concurrent_turns() {
        for round in 0..50 {
            let (manager, mut rx) = manager(4);
            let manager = Arc::new(manager);
            let id = format!("call-{round}");

            let turn = {
                let manager = Arc::clone(&manager);
                let id = id.clone();
                tokio::spawn(async move { manager.turn_completed(&id, "hello").await })
            };
            let start = {
                let manager = Arc::clone(&manager);
                let id = id.clone();
                tokio::spawn(async move { manager.start(&id).await.map(|s| s.is_greeted()) })
            };

            assert!(start.await.unwrap().unwrap());
            turn.await.unwrap().unwrap();

            // greeting first, then the default reply for the turn
            assert!(matches!(
                rx.try_recv(),
                Ok(OutboundEvent::Reply { instructions: Some(_), .. })
            ));
            assert!(matches!(
                rx.try_recv(),
                Ok(OutboundEvent::Reply { instructions: None, .. })
            ));
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_failed_greeting_discards_session() {
        let (manager, rx) = manager(4);
        drop(rx);

        assert!(manager.start("a").await.is_err());
        assert!(manager.is_empty());
    }
}
