use serde::Serialize;
use thiserror::Error;

/// Raised while turning the environment into target descriptors. Any one of
/// these aborts the run before a single invocation is dispatched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("failed to parse target index from '{key}'")]
    InvalidIndex { key: String },

    #[error("LAMBDA_{index}_COUNT must be a 32-bit integer, got '{value}'")]
    InvalidCount { index: u32, value: String },

    #[error("LAMBDA_{index}_FUNCTION must not be empty")]
    EmptyFunctionName { index: u32 },

    #[error("total invocations across all targets exceed {limit}")]
    TooManyInvocations { limit: usize },
}

/// Per-invocation failure. Recorded on the outcome, never fatal to the run.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum InvocationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl InvocationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}
