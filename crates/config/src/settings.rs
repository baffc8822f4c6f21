//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, PersonaConfig, RealtimeConfig, StagesConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Agent persona
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Realtime speech model parameters
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Knowledge base gateway
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Inline stage catalog
    #[serde(default)]
    pub stages: StagesConfig,

    /// Optional stage catalog file, replaces `stages` when set
    #[serde(default)]
    pub stages_path: Option<String>,

    /// Session registry limits
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Knowledge base gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Consult the knowledge base for spoken questions
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the retrieval service
    #[serde(default = "default_knowledge_endpoint")]
    pub endpoint: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_knowledge_timeout_ms")]
    pub timeout_ms: u64,

    /// Substring that marks a transcript as a question
    #[serde(default = "default_question_marker")]
    pub question_marker: String,
}

fn default_knowledge_endpoint() -> String {
    "http://localhost:8100".to_string()
}
fn default_knowledge_timeout_ms() -> u64 {
    3000
}
fn default_question_marker() -> String {
    "?".to_string()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_knowledge_endpoint(),
            timeout_ms: default_knowledge_timeout_ms(),
            question_marker: default_question_marker(),
        }
    }
}

/// Session registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Maximum concurrently active sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize {
    100
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Record Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_persona()?;
        self.validate_realtime()?;
        self.validate_knowledge()?;
        self.validate_sessions()?;
        self.stages.validate()?;
        Ok(())
    }

    fn validate_persona(&self) -> Result<(), ConfigError> {
        let persona = &self.persona;
        for (field, value) in [
            ("persona.name", &persona.name),
            ("persona.company", &persona.company),
            ("persona.language", &persona.language),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_realtime(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.realtime.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "realtime.temperature".to_string(),
                message: format!(
                    "Must be between 0.0 and 2.0, got {}",
                    self.realtime.temperature
                ),
            });
        }
        Ok(())
    }

    fn validate_knowledge(&self) -> Result<(), ConfigError> {
        let knowledge = &self.knowledge;
        if !knowledge.enabled {
            return Ok(());
        }
        if !knowledge.endpoint.starts_with("http://") && !knowledge.endpoint.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "knowledge.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", knowledge.endpoint),
            });
        }
        if knowledge.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "knowledge.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }
        if knowledge.question_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "knowledge.question_marker".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults.
/// A `stages_path` replaces the inline catalog; missing built-in stages are
/// always filled in.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Same as [`load_settings`] with the config directory given explicitly
pub fn load_settings_from(
    config_dir: impl AsRef<Path>,
    env: Option<&str>,
) -> Result<Settings, ConfigError> {
    let config_dir = config_dir.as_ref();
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
    );

    if let Some(env_name) = env {
        builder = builder.add_source(
            File::with_name(&config_dir.join(env_name).to_string_lossy()).required(false),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix("ONBOARDING_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    if let Some(path) = settings.stages_path.as_deref() {
        settings.stages = StagesConfig::from_yaml_file(path)?;
    }
    settings.stages = settings.stages.with_defaults();

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboarding_agent_core::StageId;
    use std::fs;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.knowledge.enabled);
        assert_eq!(settings.knowledge.question_marker, "?");
        assert_eq!(settings.sessions.max_sessions, 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_temperature_validation() {
        let mut settings = Settings::default();
        settings.realtime.temperature = 3.0;
        assert!(settings.validate().is_err());

        settings.realtime.temperature = 0.8;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_knowledge_validation_only_when_enabled() {
        let mut settings = Settings::default();
        settings.knowledge.endpoint = "not-a-url".to_string();
        assert!(settings.validate().is_ok());

        settings.knowledge.enabled = true;
        assert!(settings.validate().is_err());

        settings.knowledge.endpoint = "http://kb.internal:8100".to_string();
        assert!(settings.validate().is_ok());

        settings.knowledge.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_persona_rejected() {
        let mut settings = Settings::default();
        settings.persona.name = " ".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "persona.name"
        ));
    }

    #[test]
    fn test_zero_sessions_rejected() {
        let mut settings = Settings::default();
        settings.sessions.max_sessions = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r#"
environment: production
persona:
  name: Priya
knowledge:
  enabled: true
  endpoint: http://localhost:9000
stages:
  kyc:
    guidance: Ask for the PAN card.
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.persona.name, "Priya");
        assert_eq!(settings.persona.company, "NxtWave");
        assert!(settings.knowledge.enabled);
        assert_eq!(settings.knowledge.timeout_ms, 3000);

        let stages = settings.stages.with_defaults();
        assert_eq!(
            stages.get(&StageId::Kyc).unwrap().guidance,
            "Ask for the PAN card."
        );
        assert!(stages.get(&StageId::Rca).is_some());
    }

    #[test]
    fn test_load_settings_layering() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("config");
        fs::create_dir(&config_dir).unwrap();

        let stages_path = dir.path().join("stages.yaml");
        fs::write(&stages_path, "kyc:\n  guidance: Collect PAN and Aadhaar.\n").unwrap();

        fs::write(
            config_dir.join("default.yaml"),
            "persona:\n  name: Harshitha\nknowledge:\n  timeout_ms: 1500\nsessions:\n  max_sessions: 10\n",
        )
        .unwrap();
        fs::write(
            config_dir.join("staging.yaml"),
            format!(
                "environment: staging\npersona:\n  name: Priya\nstages_path: {}\n",
                stages_path.display()
            ),
        )
        .unwrap();

        std::env::set_var("ONBOARDING_AGENT__KNOWLEDGE__ENABLED", "true");
        let loaded = load_settings_from(&config_dir, Some("staging"));
        std::env::remove_var("ONBOARDING_AGENT__KNOWLEDGE__ENABLED");
        let settings = loaded.unwrap();

        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.persona.name, "Priya");
        assert_eq!(settings.persona.company, "NxtWave");
        assert!(settings.knowledge.enabled);
        assert_eq!(settings.knowledge.timeout_ms, 1500);
        assert_eq!(settings.knowledge.question_marker, "?");
        assert_eq!(settings.sessions.max_sessions, 10);

        assert_eq!(settings.stages.stages.len(), StageId::CANONICAL.len());
        assert_eq!(
            settings.stages.get(&StageId::Kyc).unwrap().guidance,
            "Collect PAN and Aadhaar."
        );
        assert!(settings.stages.get(&StageId::NbfcSelection).is_some());
    }

    #[test]
    fn test_load_settings_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert_eq!(settings.knowledge.endpoint, "http://localhost:8100");
        assert_eq!(settings.stages.stages.len(), StageId::CANONICAL.len());
    }
}
