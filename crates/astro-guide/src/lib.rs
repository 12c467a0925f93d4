//! AstroGuide answer generator
//!
//! Turns a validated chat request into a structured answer:
//! - fixed system instruction
//! - bounded slice of the caller's history
//! - final `Level:` / `Question:` user turn
//! - forced `astroguide_response` function call at low temperature
//!
//! Parsing failures are kept typed inside [`AnswerGenerator::try_answer`]
//! and collapsed into [`AnswerResult::fallback`] by [`AnswerGenerator::answer`].
//!
//! Author: hephaex@gmail.com

use astro_core::{
    AnswerResult, AppConfig, AstroError, ChatMessage, ChatRequest, ChatTurn, CompletionClient,
    CompletionRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod llm;
pub mod prompt;

pub use llm::{create_completion_client, OpenAiClient};
pub use prompt::{function_spec, FUNCTION_NAME, REFUSAL_ANSWER, SYSTEM_INSTRUCTION};

// ============================================================================
// Configuration
// ============================================================================

/// Generator configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Sampling temperature sent with every completion
    pub temperature: f32,

    /// Most recent history turns forwarded to the model
    pub max_history_turns: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_history_turns: 10,
        }
    }
}

impl From<&AppConfig> for GeneratorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            temperature: config.llm.temperature,
            max_history_turns: config.guide.max_history_turns,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a generation attempt produced no usable answer
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion service failed: {0}")]
    Upstream(#[from] AstroError),

    #[error("function arguments did not match the answer schema: {0}")]
    MalformedArguments(#[from] serde_json::Error),

    #[error("answer was empty")]
    EmptyAnswer,
}

/// Arguments of the `astroguide_response` call
#[derive(Debug, Deserialize)]
struct StructuredAnswer {
    answer: String,
    sources: Vec<String>,
}

/// Parse raw function-call arguments into an answer
///
/// Source count and URL shape are advisory to the model and are passed
/// through unchecked.
pub fn parse_arguments(raw: &str) -> Result<AnswerResult, GenerationError> {
    let parsed: StructuredAnswer = serde_json::from_str(raw)?;
    let answer = parsed.answer.trim();

    if answer.is_empty() {
        return Err(GenerationError::EmptyAnswer);
    }

    Ok(AnswerResult::new(answer, parsed.sources))
}

/// Last `max_turns` turns of `history`, oldest first, without blank turns
pub fn bounded_history(history: &[ChatTurn], max_turns: usize) -> impl Iterator<Item = &ChatTurn> {
    let start = history.len().saturating_sub(max_turns);
    history[start..].iter().filter(|turn| !turn.is_blank())
}

// ============================================================================
// Answer Generator
// ============================================================================

/// Builds the conversation context, calls the model and parses its reply
pub struct AnswerGenerator {
    client: Arc<dyn CompletionClient>,
    config: GeneratorConfig,
}

impl AnswerGenerator {
    /// Create a new generator
    pub fn new(client: Arc<dyn CompletionClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    /// Model used by the underlying client
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Conversation context sent to the model for `request`
    pub fn build_messages(&self, request: &ChatRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.config.max_history_turns + 2);
        messages.push(ChatMessage::system(SYSTEM_INSTRUCTION));
        messages.extend(
            bounded_history(&request.history, self.config.max_history_turns).map(ChatMessage::from),
        );
        messages.push(ChatMessage::user(prompt::question_turn(
            &request.level,
            &request.message,
        )));
        messages
    }

    /// Generate an answer, keeping the failure cause
    pub async fn try_answer(&self, request: &ChatRequest) -> Result<AnswerResult, GenerationError> {
        let completion = CompletionRequest {
            messages: self.build_messages(request),
            function: function_spec(),
            temperature: self.config.temperature,
        };

        debug!(
            model = %self.client.model(),
            level = %request.level,
            history_len = request.history.len(),
            context_len = completion.messages.len(),
            "requesting structured completion"
        );

        let raw = self.client.complete_structured(&completion).await?;
        parse_arguments(&raw)
    }

    /// Generate an answer, substituting the fallback on any failure
    pub async fn answer(&self, request: &ChatRequest) -> AnswerResult {
        let start = Instant::now();

        match self.try_answer(request).await {
            Ok(result) => {
                info!(
                    sources = result.sources.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "answer generated"
                );
                result
            }
            Err(e) => {
                warn!(
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "answer generation failed, returning fallback"
                );
                AnswerResult::fallback()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
