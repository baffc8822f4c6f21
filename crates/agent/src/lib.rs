//! Conversation stage orchestration for the onboarding call
//!
//! Features:
//! - Stage catalog rendered from config with the agent persona
//! - Instruction building for the realtime speech session
//! - Per-session state machine driven by spoken turns and frontend
//!   control messages
//! - Knowledge base lookups for spoken questions, with silent fallback

pub mod catalog;
pub mod factory;
pub mod telemetry;
pub mod orchestrator;
pub mod prompts;
pub mod traits;

pub use catalog::StageCatalog;
pub use factory::OrchestratorFactory;
pub use orchestrator::{ConversationState, EventOutcome, StageOrchestrator};
pub use prompts::PromptBuilder;
pub use traits::ConversationHandler;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session error: {0}")]
    Session(#[from] onboarding_agent_core::Error),
}
