//! Chat handler
//!
//! Author: hephaex@gmail.com

use crate::extract::ValidatedJson;
use crate::state::AppState;
use astro_core::{default_level, AnswerResult, ChatRequest, ChatTurn};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Chat request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatPayload {
    /// The user's question
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "What is a black hole?")]
    pub message: String,

    /// Audience level
    #[serde(default = "default_level")]
    #[schema(example = "beginner", default = "beginner")]
    pub level: String,

    /// Earlier turns, oldest first; each `{role: "user" | "assistant", content}`
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<ChatTurn>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("message must not be empty".into());
        return Err(err);
    }
    Ok(())
}

impl From<ChatPayload> for ChatRequest {
    fn from(payload: ChatPayload) -> Self {
        ChatRequest::new(payload.message)
            .with_level(payload.level)
            .with_history(payload.history)
    }
}

/// Chat response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    /// Answer text
    #[schema(example = "A black hole is a region of space where gravity is so strong...")]
    pub answer: String,

    /// Source URLs
    #[schema(example = json!(["https://science.nasa.gov/universe/black-holes/"]))]
    pub sources: Vec<String>,
}

impl From<AnswerResult> for ChatResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            answer: result.answer,
            sources: result.sources,
        }
    }
}

/// Answer an astronomy question
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Answer generated (or fallback answer)", body = ChatResponse),
        (status = 400, description = "Malformed JSON", body = crate::error::ApiError),
        (status = 422, description = "Invalid request", body = crate::error::ApiError)
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ChatPayload>,
) -> Json<ChatResponse> {
    let request = ChatRequest::from(payload);
    let result = state.generator.answer(&request).await;

    Json(result.into())
}
