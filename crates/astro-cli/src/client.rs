//! HTTP client for the AstroGuide API and local conversation state

use anyhow::{bail, Context};
use astro_core::{AnswerResult, ChatRequest, ChatTurn};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Turns sent back to the server with each question
pub const HISTORY_WINDOW: usize = 10;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    /// POST /chat
    pub async fn send_chat(&self, request: &ChatRequest) -> anyhow::Result<AnswerResult> {
        let url = self.chat_url();
        tracing::debug!(%url, history = request.history.len(), "sending chat request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("could not reach {url}"))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "chat request rejected");
            bail!("Failed to fetch response from server");
        }

        response
            .json::<AnswerResult>()
            .await
            .context("server returned an unexpected body")
    }
}

/// Conversation kept by the interactive session, saved as a JSON array of turns
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    /// Request for `message` carrying the most recent turns
    pub fn request(&self, message: &str, level: &str) -> ChatRequest {
        let start = self.turns.len().saturating_sub(HISTORY_WINDOW);
        ChatRequest::new(message)
            .with_level(level)
            .with_history(self.turns[start..].to_vec())
    }

    pub fn record(&mut self, question: &str, answer: &str) {
        self.turns.push(ChatTurn::user(question));
        self.turns.push(ChatTurn::assistant(answer));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Host name of a source URL without a leading `www.`
pub fn display_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}
