//! The `CandidateGenerator` trait: the injected capability that proposes
//! course plans.
//!
//! The trait is object-safe so callers can pick an implementation at
//! runtime and hand the loop a `Box<dyn CandidateGenerator>`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of the advising conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// What the generator is asked for on one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    /// 1-based attempt number.
    pub attempt: u32,
    /// The conversation so far, ending with the latest user message.
    pub messages: &'a [Message],
    /// Rejection feedback from the previous attempt, if any.
    pub prior_rejection: Option<&'a str>,
}

/// Failures of a generator call. Any of these ends the recommendation loop.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to start generator command {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("generator exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("generator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode conversation: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("generator returned an empty response")]
    EmptyResponse,
}

/// Produces a free-text reply containing a `<recommendation>` section.
#[async_trait]
pub trait CandidateGenerator: Send + Sync {
    /// Short name used in logs (e.g. `"command"`).
    fn name(&self) -> &str;

    /// Produce a reply for the conversation in `request`.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GeneratorError>;
}

// Compile-time assertion: CandidateGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CandidateGenerator) {}
};
