//! Agent persona and realtime model configuration

use serde::{Deserialize, Serialize};

/// Who the agent is on the call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Name the agent introduces itself with
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Job title used in the persona preamble
    #[serde(default = "default_role")]
    pub role: String,

    /// Company the agent calls from
    #[serde(default = "default_company")]
    pub company: String,

    /// Language the agent speaks
    #[serde(default = "default_language")]
    pub language: String,

    /// Language mixed in where it helps the family understand
    #[serde(default = "default_secondary_language")]
    pub secondary_language: String,
}

fn default_agent_name() -> String {
    "Harshitha".to_string()
}
fn default_role() -> String {
    "Registration Expert".to_string()
}
fn default_company() -> String {
    "NxtWave".to_string()
}
fn default_language() -> String {
    "Telugu".to_string()
}
fn default_secondary_language() -> String {
    "English".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            role: default_role(),
            company: default_company(),
            language: default_language(),
            secondary_language: default_secondary_language(),
        }
    }
}

/// Parameters the external realtime speech session is created with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Native-audio dialog model
    #[serde(default = "default_model")]
    pub model: String,

    /// Voice preset
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gemini-2.5-flash-exp-native-audio-thinking-dialog".to_string()
}
fn default_voice() -> String {
    "Aoede".to_string()
}
fn default_temperature() -> f32 {
    0.8
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            voice: default_voice(),
            temperature: default_temperature(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_defaults() {
        let persona = PersonaConfig::default();
        assert_eq!(persona.name, "Harshitha");
        assert_eq!(persona.company, "NxtWave");
        assert_eq!(persona.language, "Telugu");
    }

    #[test]
    fn test_partial_persona_yaml() {
        let persona: PersonaConfig = serde_yaml::from_str("name: Priya\n").unwrap();
        assert_eq!(persona.name, "Priya");
        assert_eq!(persona.role, "Registration Expert");
    }
}
