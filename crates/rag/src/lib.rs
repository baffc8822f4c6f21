//! Knowledge base access for the onboarding agent
//!
//! The knowledge base itself (document loading, embeddings, index) lives in
//! an external retrieval service. This crate only provides the gateway the
//! orchestrator talks to.

pub mod http;

pub use http::{HttpKnowledgeGateway, HttpKnowledgeGatewayConfig};

use std::sync::Arc;

use onboarding_agent_config::KnowledgeConfig;
use onboarding_agent_core::KnowledgeGateway;
use thiserror::Error;

/// Knowledge gateway errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Knowledge service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No answer for query")]
    EmptyAnswer,

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Client initialization failed: {0}")]
    Initialization(String),
}

impl From<RagError> for onboarding_agent_core::Error {
    fn from(err: RagError) -> Self {
        onboarding_agent_core::Error::Knowledge(err.to_string())
    }
}

/// Build the configured gateway, or `None` when lookups are disabled
pub fn gateway_from_config(
    config: &KnowledgeConfig,
) -> Result<Option<Arc<dyn KnowledgeGateway>>, RagError> {
    if !config.enabled {
        tracing::info!("Knowledge gateway disabled");
        return Ok(None);
    }
    let gateway = HttpKnowledgeGateway::new(HttpKnowledgeGatewayConfig::from(config))?;
    tracing::info!(endpoint = %config.endpoint, "Knowledge gateway enabled");
    Ok(Some(Arc::new(gateway)))
}
