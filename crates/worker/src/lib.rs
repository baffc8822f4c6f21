//! Onboarding agent worker
//!
//! Hosts one stage orchestrator per call. The console transport reads
//! inbound call events as JSON lines and writes every reply request and
//! frontend notification back out as JSON lines.

pub mod console;
pub mod script;
pub mod session;

pub use console::{ConsoleSession, OutboundEvent};
pub use script::{payload_bytes, run_script, InboundEvent, ScriptSummary};
pub use session::{Session, SessionManager};

use thiserror::Error;

/// Worker errors
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Session limit reached ({0})")]
    SessionLimit(usize),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid event on line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent error: {0}")]
    Agent(#[from] onboarding_agent_agent::AgentError),
}
