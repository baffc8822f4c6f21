//! Conversation stage orchestrator
//!
//! One orchestrator per call. It owns the conversation state and decides,
//! for every spoken turn or control message, which stage the call is in and
//! what the speech session and the frontend should hear about it.
//!
//! ## Turn handling
//!
//! Each completed turn takes exactly one of these paths:
//! 1. In `payment_options`, a recognizable payment choice triggers the
//!    payment-selection transition. The NBFC loan path requests two replies,
//!    the continuation and then the `nbfc_selection` guidance.
//! 2. Otherwise a question is looked up in the knowledge base; the answer is
//!    spoken with the question as context.
//! 3. Otherwise (or when the lookup fails) a default reply is requested.
//!
//! ## Control messages
//!
//! At most one action per message, in precedence order: force reply,
//! explicit `payment_option.selected` transition, stage override, raw
//! payment choice. Undecodable or unrecognized payloads are dropped.
//!
//! ## Failure policy
//!
//! Nothing here ends the session. Reply and publish failures are logged at
//! the call site and processing continues; lookup failures degrade to the
//! default reply. No call is retried.

use async_trait::async_trait;
use std::sync::Arc;

use onboarding_agent_core::{
    ControlMessage, KnowledgeGateway, Notification, NotificationPublisher, PaymentChoice,
    ReplySession, StageId,
};

use crate::catalog::StageCatalog;
use crate::prompts::PromptBuilder;
use crate::telemetry;
use crate::traits::ConversationHandler;
use crate::AgentError;

/// Mutable state of one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Current stage
    pub stage: StageId,
    /// Last canonical payment choice, never cleared within a session
    pub payment_choice: Option<PaymentChoice>,
}

/// What an inbound event resulted in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A payment choice was recognized and its transition ran
    PaymentSelected(PaymentChoice),
    /// A spoken question was answered from the knowledge base
    KnowledgeReply,
    /// A context-free reply was requested
    DefaultReply,
    /// The participant was re-engaged
    ForceReply,
    /// A frontend-directed transition moved the call to this stage
    Transitioned(StageId),
    /// A frontend selection was recorded without a transition
    ChoiceRecorded(Option<PaymentChoice>),
    /// The stage was overridden by the frontend
    StageSet(StageId),
    /// The event was dropped
    Ignored,
}

#[derive(Debug, Clone, Copy)]
enum ReplyKind {
    Default,
    Knowledge,
    ForceReply,
    Guidance,
    Handoff,
    Continuation,
    Relay,
    Greeting,
}

impl ReplyKind {
    fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Default => "default",
            ReplyKind::Knowledge => "knowledge",
            ReplyKind::ForceReply => "force_reply",
            ReplyKind::Guidance => "guidance",
            ReplyKind::Handoff => "handoff",
            ReplyKind::Continuation => "continuation",
            ReplyKind::Relay => "relay",
            ReplyKind::Greeting => "greeting",
        }
    }
}

/// Stage state machine for a single call
pub struct StageOrchestrator {
    session_id: String,
    state: ConversationState,
    catalog: Arc<StageCatalog>,
    prompts: Arc<PromptBuilder>,
    replies: Arc<dyn ReplySession>,
    publisher: Arc<dyn NotificationPublisher>,
    knowledge: Option<Arc<dyn KnowledgeGateway>>,
    question_marker: String,
}

impl StageOrchestrator {
    /// Create an orchestrator for a freshly started session
    pub fn new(
        session_id: impl Into<String>,
        catalog: Arc<StageCatalog>,
        prompts: Arc<PromptBuilder>,
        replies: Arc<dyn ReplySession>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            state: ConversationState::default(),
            catalog,
            prompts,
            replies,
            publisher,
            knowledge: None,
            question_marker: "?".to_string(),
        }
    }

    /// Consult a knowledge gateway for spoken questions
    pub fn with_knowledge(mut self, gateway: Arc<dyn KnowledgeGateway>) -> Self {
        self.knowledge = Some(gateway);
        self
    }

    /// Substring that marks a transcript as a question
    pub fn with_question_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.is_empty() {
            self.question_marker = marker;
        }
        self
    }

    /// Start in a stage other than `greeting`
    pub fn with_initial_stage(mut self, stage: StageId) -> Self {
        self.state.stage = stage;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn stage(&self) -> &StageId {
        &self.state.stage
    }

    pub fn payment_choice(&self) -> Option<PaymentChoice> {
        self.state.payment_choice
    }

    pub fn is_finished(&self) -> bool {
        self.catalog.is_terminal(&self.state.stage)
    }

    /// Greet the participant once the call connects
    pub async fn start(&self) -> Result<(), AgentError> {
        tracing::info!(
            session_id = %self.session_id,
            stage = %self.state.stage,
            knowledge = self.knowledge.is_some(),
            "Starting onboarding conversation"
        );
        let kind = ReplyKind::Greeting;
        match self
            .replies
            .generate_reply(Some(self.prompts.initial_greeting()))
            .await
        {
            Ok(()) => {
                telemetry::record_reply(kind.as_str());
                Ok(())
            },
            Err(e) => {
                telemetry::record_reply_failure(kind.as_str());
                Err(e.into())
            },
        }
    }

    /// Handle a completed user turn
    pub async fn handle_turn_completed(&mut self, transcript: &str) -> EventOutcome {
        let transcript = transcript.trim();
        tracing::info!(
            session_id = %self.session_id,
            stage = %self.state.stage,
            transcript,
            "User turn completed"
        );

        if self.state.stage == StageId::PaymentOptions {
            if let Some(choice) = PaymentChoice::normalize(transcript) {
                self.record_choice(choice);
                self.run_payment_transition(choice).await;
                return EventOutcome::PaymentSelected(choice);
            }
        }

        if let Some(gateway) = self.knowledge.clone() {
            if transcript.contains(self.question_marker.as_str()) {
                match gateway.query(transcript).await {
                    Ok(context) => {
                        telemetry::record_knowledge_lookup("answered");
                        let instructions = self.prompts.knowledge_answer(transcript, &context);
                        self.dispatch_reply(ReplyKind::Knowledge, Some(instructions))
                            .await;
                        return EventOutcome::KnowledgeReply;
                    },
                    Err(e) => {
                        telemetry::record_knowledge_lookup("failed");
                        tracing::warn!(
                            session_id = %self.session_id,
                            gateway = gateway.name(),
                            error = %e,
                            "Knowledge lookup failed, falling back to default reply"
                        );
                    },
                }
            }
        }

        self.dispatch_reply(ReplyKind::Default, None).await;
        EventOutcome::DefaultReply
    }

    /// Handle a structured message from the frontend
    pub async fn handle_data_received(
        &mut self,
        data: &[u8],
        participant_identity: &str,
    ) -> EventOutcome {
        let message = match ControlMessage::decode(data) {
            Ok(Some(message)) => message,
            Ok(None) => {
                telemetry::record_control_message("unrecognized");
                tracing::warn!(
                    session_id = %self.session_id,
                    participant = participant_identity,
                    "Ignoring unrecognized control message"
                );
                return EventOutcome::Ignored;
            },
            Err(e) => {
                telemetry::record_control_message("malformed");
                tracing::warn!(
                    session_id = %self.session_id,
                    participant = participant_identity,
                    error = %e,
                    "Ignoring malformed control message"
                );
                return EventOutcome::Ignored;
            },
        };

        telemetry::record_control_message(message.kind());
        tracing::info!(
            session_id = %self.session_id,
            participant = participant_identity,
            kind = message.kind(),
            stage = %self.state.stage,
            "Control message received"
        );

        match message {
            ControlMessage::ForceReply => {
                let instructions = self.prompts.force_reply(&self.state.stage);
                self.dispatch_reply(ReplyKind::ForceReply, Some(instructions))
                    .await;
                EventOutcome::ForceReply
            },
            ControlMessage::PaymentOptionSelected {
                choice,
                next_stage,
                agent_message,
            } => {
                if let Some(raw) = choice.as_deref() {
                    match PaymentChoice::normalize(raw) {
                        Some(choice) => self.record_choice(choice),
                        None => tracing::debug!(
                            session_id = %self.session_id,
                            raw,
                            "Selected option does not map to a payment choice"
                        ),
                    }
                }
                match next_stage {
                    Some(next_stage) => {
                        self.run_explicit_transition(StageId::parse(&next_stage), agent_message)
                            .await;
                        EventOutcome::Transitioned(self.state.stage.clone())
                    },
                    None => EventOutcome::ChoiceRecorded(self.state.payment_choice),
                }
            },
            ControlMessage::SetStage(stage) => {
                self.enter_stage(stage);
                self.dispatch_stage_guidance().await;
                EventOutcome::StageSet(self.state.stage.clone())
            },
            ControlMessage::PaymentChoice { raw, title } => match PaymentChoice::normalize(&raw) {
                Some(choice) => {
                    tracing::info!(
                        session_id = %self.session_id,
                        choice = %choice,
                        title = title.as_deref().unwrap_or(""),
                        "Payment choice selected on screen"
                    );
                    self.record_choice(choice);
                    self.run_payment_transition(choice).await;
                    EventOutcome::PaymentSelected(choice)
                },
                None => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        raw = %raw,
                        "Unrecognized payment choice"
                    );
                    EventOutcome::Ignored
                },
            },
        }
    }

    /// Transition implied by a newly recorded choice
    async fn run_payment_transition(&mut self, choice: PaymentChoice) {
        if choice.ends_flow() {
            self.enter_stage(StageId::Completed);
            let instructions = self.prompts.human_handoff(choice);
            self.dispatch_reply(ReplyKind::Handoff, Some(instructions))
                .await;
            self.publish(Notification::ended(StageId::Completed, Some(choice), None))
                .await;
        } else {
            self.enter_stage(StageId::NbfcSelection);
            let instructions = self.prompts.nbfc_continuation();
            self.dispatch_reply(ReplyKind::Continuation, Some(instructions))
                .await;
            self.publish(Notification::stage_advanced(
                StageId::NbfcSelection,
                Some(choice),
            ))
            .await;
            self.dispatch_stage_guidance().await;
        }
    }

    /// Transition directed by the frontend, overriding inferred routing
    async fn run_explicit_transition(&mut self, next: StageId, agent_message: Option<String>) {
        if let Some(message) = agent_message.as_deref() {
            let instructions = self.prompts.relay_agent_message(message);
            self.dispatch_reply(ReplyKind::Relay, Some(instructions))
                .await;
        }

        if self.catalog.is_terminal(&next) {
            self.enter_stage(next.clone());
            self.publish(Notification::ended(
                next,
                self.state.payment_choice,
                agent_message,
            ))
            .await;
        } else {
            self.enter_stage(next.clone());
            self.publish(Notification::stage_advanced(next, self.state.payment_choice))
                .await;
            self.dispatch_stage_guidance().await;
        }
    }

    /// Speak the current stage's guidance. Returns whether a reply was sent.
    async fn dispatch_stage_guidance(&self) -> bool {
        let stage = &self.state.stage;
        if self.catalog.is_terminal(stage) {
            tracing::debug!(session_id = %self.session_id, stage = %stage, "Terminal stage, no guidance");
            return false;
        }
        let Some(directive) = self.catalog.guidance(stage) else {
            tracing::debug!(session_id = %self.session_id, stage = %stage, "No guidance for stage");
            return false;
        };
        let instructions = self.prompts.stage_guidance(stage, directive);
        self.dispatch_reply(ReplyKind::Guidance, Some(instructions))
            .await
    }

    fn enter_stage(&mut self, stage: StageId) {
        if self.state.stage != stage {
            tracing::info!(
                session_id = %self.session_id,
                from = %self.state.stage,
                to = %stage,
                "Stage transition"
            );
        }
        telemetry::record_stage_transition(&stage);
        self.state.stage = stage;
    }

    fn record_choice(&mut self, choice: PaymentChoice) {
        if let Some(previous) = self.state.payment_choice.filter(|p| *p != choice) {
            tracing::info!(
                session_id = %self.session_id,
                previous = %previous,
                choice = %choice,
                "Payment choice changed"
            );
        }
        self.state.payment_choice = Some(choice);
    }

    async fn dispatch_reply(&self, kind: ReplyKind, instructions: Option<String>) -> bool {
        match self.replies.generate_reply(instructions).await {
            Ok(()) => {
                telemetry::record_reply(kind.as_str());
                true
            },
            Err(e) => {
                telemetry::record_reply_failure(kind.as_str());
                tracing::error!(
                    session_id = %self.session_id,
                    kind = kind.as_str(),
                    error = %e,
                    "Reply dispatch failed"
                );
                false
            },
        }
    }

    async fn publish(&self, notification: Notification) {
        let kind = notification.kind();
        let payload = match notification.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                telemetry::record_notification_failure(kind);
                tracing::error!(session_id = %self.session_id, kind, error = %e, "Failed to encode notification");
                return;
            },
        };
        match self.publisher.publish(payload, true).await {
            Ok(()) => telemetry::record_notification(kind),
            Err(e) => {
                telemetry::record_notification_failure(kind);
                tracing::warn!(
                    session_id = %self.session_id,
                    kind,
                    error = %e,
                    "Failed to publish notification"
                );
            },
        }
    }
}

#[async_trait]
impl ConversationHandler for StageOrchestrator {
    async fn on_turn_completed(&mut self, transcript: &str) -> EventOutcome {
        self.handle_turn_completed(transcript).await
    }

    async fn on_data_received(&mut self, data: &[u8], participant_identity: &str) -> EventOutcome {
        self.handle_data_received(data, participant_identity).await
    }
}
