//! Per-session orchestrator construction
//!
//! Holds everything sessions share (catalog, prompts, knowledge gateway) and
//! hands each new session its own orchestrator. The knowledge gateway is
//! injected here once instead of living in a process-wide global.

use std::sync::Arc;

use onboarding_agent_config::Settings;
use onboarding_agent_core::{KnowledgeGateway, NotificationPublisher, ReplySession};

use crate::catalog::StageCatalog;
use crate::orchestrator::StageOrchestrator;
use crate::prompts::PromptBuilder;

/// Builds one `StageOrchestrator` per session
#[derive(Clone)]
pub struct OrchestratorFactory {
    catalog: Arc<StageCatalog>,
    prompts: Arc<PromptBuilder>,
    knowledge: Option<Arc<dyn KnowledgeGateway>>,
    question_marker: String,
}

impl OrchestratorFactory {
    pub fn new(catalog: StageCatalog, prompts: PromptBuilder) -> Self {
        Self {
            catalog: Arc::new(catalog),
            prompts: Arc::new(prompts),
            knowledge: None,
            question_marker: "?".to_string(),
        }
    }

    /// Build from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        let catalog = StageCatalog::new(&settings.stages, &settings.persona);
        tracing::info!(stages = catalog.len(), "Stage catalog loaded");
        Self::new(catalog, PromptBuilder::new(settings.persona.clone()))
            .with_question_marker(settings.knowledge.question_marker.clone())
    }

    pub fn with_knowledge(mut self, gateway: Option<Arc<dyn KnowledgeGateway>>) -> Self {
        self.knowledge = gateway;
        self
    }

    pub fn with_question_marker(mut self, marker: impl Into<String>) -> Self {
        self.question_marker = marker.into();
        self
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Orchestrator for a new session bound to its speech session and data channel
    pub fn create(
        &self,
        session_id: impl Into<String>,
        replies: Arc<dyn ReplySession>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> StageOrchestrator {
        let orchestrator = StageOrchestrator::new(
            session_id,
            Arc::clone(&self.catalog),
            Arc::clone(&self.prompts),
            replies,
            publisher,
        )
        .with_question_marker(self.question_marker.clone());

        match &self.knowledge {
            Some(gateway) => orchestrator.with_knowledge(Arc::clone(gateway)),
            None => orchestrator,
        }
    }
}
