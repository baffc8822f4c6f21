//! Stage catalog definitions
//!
//! Guidance text per stage, loaded once at startup. Templates may use the
//! placeholders `{agent_name}`, `{role}`, `{company}`, `{language}` and
//! `{secondary_language}`; they are filled in from the persona when the
//! catalog is built.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use onboarding_agent_core::StageId;

use crate::ConfigError;

/// Definition of a single stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Directive handed to the speech session on entering the stage
    #[serde(default)]
    pub guidance: String,

    /// Terminal stages end the conversation and never receive guidance
    #[serde(default)]
    pub terminal: bool,
}

impl StageDefinition {
    fn guided(guidance: &str) -> Self {
        Self {
            guidance: guidance.to_string(),
            terminal: false,
        }
    }

    fn terminal() -> Self {
        Self {
            guidance: String::new(),
            terminal: true,
        }
    }
}

/// Stage id to definition mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagesConfig {
    pub stages: BTreeMap<String, StageDefinition>,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StagesConfig {
    /// Built-in onboarding script
    pub fn builtin() -> Self {
        let mut stages = BTreeMap::new();
        stages.insert(
            "greeting".to_string(),
            StageDefinition::guided(
                "You are in the greeting stage. Greet the parent warmly, introduce yourself as \
                 {agent_name} from {company}, and build rapport before talking about the program.",
            ),
        );
        stages.insert(
            "payment_options".to_string(),
            StageDefinition::guided(
                "You are now in the payment options stage. Proactively explain the three ways to \
                 pay the program fee: credit card, full upfront payment, or a 0% interest loan \
                 with an NBFC partner paid as monthly EMI. Ask which option suits the family.",
            ),
        );
        stages.insert(
            "nbfc_selection".to_string(),
            StageDefinition::guided(
                "You are in the NBFC selection stage. Explain that the loan is offered by partner \
                 NBFCs at 0% interest, how the monthly EMI works, and help the parent pick the \
                 partner and tenure that fits their budget.",
            ),
        );
        stages.insert(
            "kyc".to_string(),
            StageDefinition::guided(
                "You are in the KYC stage. Proactively explain the documents needed for the loan \
                 process: PAN card, Aadhaar card and recent bank statements of the applicant, and \
                 how to upload them on the screen.",
            ),
        );
        stages.insert(
            "rca".to_string(),
            StageDefinition::guided(
                "You are in the follow-up stage. Politely ask what is holding the family back from \
                 completing the registration, listen carefully, and address each concern honestly.",
            ),
        );
        stages.insert("completed".to_string(), StageDefinition::terminal());
        Self { stages }
    }

    /// Load a catalog from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let config: StagesConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill in any built-in stage missing from this catalog
    pub fn with_defaults(mut self) -> Self {
        for (id, definition) in Self::builtin().stages {
            self.stages.entry(id).or_insert(definition);
        }
        self
    }

    /// Definition for a stage
    pub fn get(&self, stage: &StageId) -> Option<&StageDefinition> {
        self.stages.get(stage.as_str())
    }

    /// Validate stage definitions
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, definition) in &self.stages {
            let stage = StageId::parse(id);
            if stage.as_str() != id {
                return Err(ConfigError::InvalidValue {
                    field: format!("stages.{}", id),
                    message: format!("Legacy stage name, use '{}' instead", stage),
                });
            }
            if !definition.terminal && definition.guidance.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("stages.{}.guidance", id),
                    message: "Non-terminal stage needs guidance".to_string(),
                });
            }
            if stage.is_terminal() && !definition.terminal {
                return Err(ConfigError::InvalidValue {
                    field: format!("stages.{}.terminal", id),
                    message: "Stage is always terminal".to_string(),
                });
            }
            if !stage.is_known() {
                tracing::warn!(stage = %id, "Stage not part of the onboarding script");
            }
        }
        Ok(())
    }
}
