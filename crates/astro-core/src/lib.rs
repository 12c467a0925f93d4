//! AstroGuide Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout AstroGuide:
//! - Conversation models (turns, requests, answers)
//! - Completion protocol types (messages, function schema)
//! - Common error types
//! - The `CompletionClient` trait implemented by LLM backends
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;

pub use config::{AppConfig, ConfigError, GuideConfig, LlmConfig, LlmProvider, ServerConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for AstroGuide operations
#[derive(Error, Debug)]
pub enum AstroError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, AstroError>;

// ============================================================================
// Conversation Models
// ============================================================================

/// Level used when the caller does not send one.
pub const DEFAULT_LEVEL: &str = "beginner";

/// Answer substituted whenever the model output cannot be used.
pub const FALLBACK_ANSWER: &str = "I'm unable to answer that right now.";

/// Speaker of a caller-supplied history turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One earlier exchange in the conversation, as sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// True when the content is empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A validated question with its level and prior turns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The new question
    pub message: String,

    /// Audience level, conventionally "beginner" or "advanced"
    #[serde(default = "default_level")]
    pub level: String,

    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// [`DEFAULT_LEVEL`] as an owned string, for serde defaults
pub fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

impl ChatRequest {
    /// Create a request with the default level and no history
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: default_level(),
            history: Vec::new(),
        }
    }

    /// Set level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set history
    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Structured answer returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Answer text
    pub answer: String,

    /// Source URLs backing the answer
    pub sources: Vec<String>,
}

impl AnswerResult {
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }

    /// The fixed answer used when generation fails
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ANSWER, Vec::new())
    }

    pub fn is_fallback(&self) -> bool {
        self.answer == FALLBACK_ANSWER && self.sources.is_empty()
    }
}

// ============================================================================
// Completion Protocol Types
// ============================================================================

/// Role of a message sent to the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<ChatRole> for MessageRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => Self::User,
            ChatRole::Assistant => Self::Assistant,
        }
    }
}

/// A single entry of the conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Function the model is forced to call with schema-conforming arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name (e.g., "astroguide_response")
    pub name: String,

    /// What the function is for
    pub description: String,

    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

/// Everything needed for one structured completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub function: FunctionSpec,
    pub temperature: f32,
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for completion backends that support forced function calls
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run a completion that must answer through `request.function`,
    /// returning the raw JSON arguments string of that call
    async fn complete_structured(&self, request: &CompletionRequest) -> Result<String>;

    /// Model identifier, for logging and metrics
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
