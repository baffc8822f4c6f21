//! Stage catalog
//!
//! Immutable lookup from stage to rendered guidance text, built once from
//! `StagesConfig` and shared by every session.

use std::collections::HashMap;

use onboarding_agent_config::{PersonaConfig, StagesConfig};
use onboarding_agent_core::StageId;

#[derive(Debug, Clone)]
struct CatalogEntry {
    guidance: Option<String>,
    terminal: bool,
}

/// Rendered stage catalog
#[derive(Debug, Clone)]
pub struct StageCatalog {
    entries: HashMap<StageId, CatalogEntry>,
}

impl StageCatalog {
    /// Build from config, filling persona placeholders
    pub fn new(config: &StagesConfig, persona: &PersonaConfig) -> Self {
        let entries = config
            .stages
            .iter()
            .map(|(id, definition)| {
                let stage = StageId::parse(id);
                let terminal = definition.terminal || stage.is_terminal();
                let guidance = Some(render(&definition.guidance, persona))
                    .filter(|text| !terminal && !text.trim().is_empty());
                (stage, CatalogEntry { guidance, terminal })
            })
            .collect();
        Self { entries }
    }

    /// Built-in script with the default persona
    pub fn builtin() -> Self {
        Self::new(&StagesConfig::builtin(), &PersonaConfig::default())
    }

    /// Guidance for a stage; `None` for terminal or unknown stages
    pub fn guidance(&self, stage: &StageId) -> Option<&str> {
        self.entries
            .get(stage)
            .and_then(|entry| entry.guidance.as_deref())
    }

    pub fn is_terminal(&self, stage: &StageId) -> bool {
        stage.is_terminal() || self.entries.get(stage).is_some_and(|entry| entry.terminal)
    }

    pub fn contains(&self, stage: &StageId) -> bool {
        self.entries.contains_key(stage)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn render(template: &str, persona: &PersonaConfig) -> String {
    template
        .replace("{agent_name}", &persona.name)
        .replace("{role}", &persona.role)
        .replace("{company}", &persona.company)
        .replace("{language}", &persona.language)
        .replace("{secondary_language}", &persona.secondary_language)
}
