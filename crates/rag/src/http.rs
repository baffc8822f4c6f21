//! HTTP knowledge gateway
//!
//! Posts the question to `<endpoint>/query` as `{"query": "..."}` and expects
//! `{"answer": "..."}` back. Blank answers count as failures so the caller
//! falls back to a plain reply.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use onboarding_agent_config::KnowledgeConfig;
use onboarding_agent_core::KnowledgeGateway;

use crate::RagError;

/// HTTP gateway configuration
#[derive(Debug, Clone)]
pub struct HttpKnowledgeGatewayConfig {
    /// Base URL of the retrieval service
    pub endpoint: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl From<&KnowledgeConfig> for HttpKnowledgeGatewayConfig {
    fn from(config: &KnowledgeConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(alias = "response")]
    answer: Option<String>,
}

/// Knowledge gateway backed by an HTTP retrieval service
pub struct HttpKnowledgeGateway {
    client: Client,
    config: HttpKnowledgeGatewayConfig,
}

impl HttpKnowledgeGateway {
    pub fn new(config: HttpKnowledgeGatewayConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Initialization(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.config.endpoint.trim_end_matches('/'))
    }

    /// Run a lookup, returning the crate error
    pub async fn lookup(&self, text: &str) -> Result<String, RagError> {
        let response = self
            .client
            .post(self.query_url())
            .json(&QueryRequest { query: text })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Status { status, body });
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))?;

        match parsed.answer {
            Some(answer) if !answer.trim().is_empty() => Ok(answer.trim().to_string()),
            _ => Err(RagError::EmptyAnswer),
        }
    }

    fn request_error(&self, err: reqwest::Error) -> RagError {
        if err.is_timeout() {
            RagError::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            RagError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl KnowledgeGateway for HttpKnowledgeGateway {
    async fn query(&self, text: &str) -> onboarding_agent_core::Result<String> {
        let answer = self.lookup(text).await?;
        tracing::debug!(chars = answer.len(), "Knowledge lookup answered");
        Ok(answer)
    }

    fn name(&self) -> &str {
        "http_knowledge"
    }
}
