//! Configuration management for the onboarding voice agent
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`ONBOARDING_AGENT_` prefix, `__` separator)
//! - A separate stage catalog file (`stages_path`)

pub mod agent;
pub mod settings;
pub mod stages;

pub use agent::{PersonaConfig, RealtimeConfig};
pub use settings::{
    load_settings, load_settings_from, KnowledgeConfig, ObservabilityConfig, RuntimeEnvironment,
    SessionsConfig, Settings,
};
pub use stages::{StageDefinition, StagesConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
