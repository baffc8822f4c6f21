//! Instructions handed to the realtime speech session
//!
//! Every instruction is self-contained: the speech model receives it as a
//! one-off directive on top of its session-level system instructions.

use onboarding_agent_config::PersonaConfig;
use onboarding_agent_core::{PaymentChoice, StageId};

/// Builds instruction text for the agent persona
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    persona: PersonaConfig,
}

impl PromptBuilder {
    pub fn new(persona: PersonaConfig) -> Self {
        Self { persona }
    }

    /// Session-level instructions the realtime model is created with
    pub fn system_instructions(&self) -> String {
        let p = &self.persona;
        format!(
            "You are '{}', a {} '{}'. Speak only {}. Your goal: guide parents through onboarding. \
             You will receive stage updates. Follow them precisely to lead the conversation.",
            p.name, p.company, p.role, p.language
        )
    }

    /// First thing said once the call connects
    pub fn initial_greeting(&self) -> String {
        let p = &self.persona;
        format!(
            "The call has just connected. As '{}', begin the conversation immediately in {}. \
             Greet the parent warmly, introduce yourself, and state the call's purpose. \
             Then, pause and wait for the human to respond.",
            p.name, p.language
        )
    }

    /// Persona preamble shared by composite instructions
    fn preamble(&self) -> String {
        let p = &self.persona;
        format!(
            "You are {}, a {} from {}, speaking with a parent about their child's registration.",
            p.name, p.role, p.company
        )
    }

    fn language_note(&self) -> String {
        let p = &self.persona;
        format!(
            "Answer in {}, mixing in {} words where it helps the parent understand.",
            p.language, p.secondary_language
        )
    }

    /// Stage guidance on entering a stage
    pub fn stage_guidance(&self, stage: &StageId, directive: &str) -> String {
        format!(
            "{} The conversation has moved to the {} stage. Proactively begin this part of the \
             conversation, following these instructions: {} {}",
            self.preamble(),
            stage.display_name(),
            directive.trim(),
            self.language_note()
        )
    }

    /// Answer a spoken question from retrieved knowledge
    pub fn knowledge_answer(&self, question: &str, context: &str) -> String {
        format!(
            "{} The parent asked: \"{}\". Answer using this information from the program \
             knowledge base: {} If it does not cover the question, say you will check and get \
             back to them. {}",
            self.preamble(),
            question.trim(),
            context.trim(),
            self.language_note()
        )
    }

    /// Re-engage a quiet participant
    pub fn force_reply(&self, stage: &StageId) -> String {
        format!(
            "{} The parent has gone quiet during the {} stage. Gently check whether they are \
             still there and continue from where you left off. {}",
            self.preamble(),
            stage.display_name(),
            self.language_note()
        )
    }

    /// Choice settled directly with a counsellor
    pub fn human_handoff(&self, choice: PaymentChoice) -> String {
        format!(
            "{} The parent has chosen to pay by {}. Thank them, confirm that a counsellor from \
             our team will call shortly to complete the payment, and close the call politely. {}",
            self.preamble(),
            choice.label(),
            self.language_note()
        )
    }

    /// Continue into the NBFC loan flow
    pub fn nbfc_continuation(&self) -> String {
        format!(
            "{} The parent has chosen the {}. Acknowledge the choice warmly and tell them you \
             will now walk them through the loan partners. {}",
            self.preamble(),
            PaymentChoice::NbfcEmi.label(),
            self.language_note()
        )
    }

    /// Relay a message supplied by the frontend
    pub fn relay_agent_message(&self, message: &str) -> String {
        format!(
            "Say the following to the parent in {}, keeping its meaning exactly: {}",
            self.persona.language,
            message.trim()
        )
    }
}
