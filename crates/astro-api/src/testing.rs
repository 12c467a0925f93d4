//! Test doubles for integration tests
//!
//! Author: hephaex@gmail.com

use astro_core::{AstroError, CompletionClient, CompletionRequest, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Default function-call arguments returned by the mock
pub const MOCK_ARGUMENTS: &str = r#"{"answer": "A black hole is a region where gravity prevents anything, even light, from escaping.", "sources": ["https://science.nasa.gov/universe/black-holes/"]}"#;

/// Completion client that replays a fixed reply and records each request
pub struct MockCompletionClient {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Reply with the given raw function arguments
    pub fn with_arguments(raw: impl Into<String>) -> Self {
        Self {
            reply: Ok(raw.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with an upstream error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Err(reason.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::with_arguments(MOCK_ARGUMENTS)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete_structured(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        self.reply.clone().map_err(AstroError::LlmError)
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
