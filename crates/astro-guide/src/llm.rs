//! Completion client implementations
//!
//! OpenAI-compatible chat completions with a forced function (tool) call.
//! Ollama is reached through its OpenAI-compatible `/v1` endpoint.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use astro_core::{
    AstroError, ChatMessage, CompletionClient, CompletionRequest, FunctionSpec, LlmConfig,
    LlmProvider, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: [Tool<'a>; 1],
    tool_choice: ToolChoice<'a>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a FunctionSpec,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: NamedFunction<'a>,
}

#[derive(Debug, Serialize)]
struct NamedFunction<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    /// Legacy `functions` API
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

impl<'a> OpenAiRequest<'a> {
    fn new(model: &'a str, max_tokens: Option<u32>, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: &request.messages,
            tools: [Tool {
                kind: "function",
                function: &request.function,
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: NamedFunction {
                    name: &request.function.name,
                },
            },
            temperature: request.temperature,
            max_tokens,
        }
    }
}

/// Pull the arguments of `function_name` out of the first choice
fn extract_arguments(response: OpenAiResponse, function_name: &str) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| AstroError::LlmError("No response generated".to_string()))?;

    let from_tools = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| call.function)
        .find(|f| f.name == function_name);

    from_tools
        .or(message.function_call.filter(|f| f.name == function_name))
        .map(|f| f.arguments)
        .ok_or_else(|| AstroError::LlmError(format!("Model did not call {function_name}")))
}

// ============================================================================
// OpenAI Client
// ============================================================================

/// OpenAI (or compatible) chat completions client
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let (api_key, base_url) = match config.provider {
            LlmProvider::OpenAI => {
                let key = config
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| AstroError::ConfigError("OpenAI API key required".to_string()))?;
                let url = config
                    .openai_base_url
                    .clone()
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_string());
                (Some(key), url)
            }
            LlmProvider::Ollama => (
                config.openai_api_key.clone(),
                format!("{}/v1", config.ollama_url.trim_end_matches('/')),
            ),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AstroError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete_structured(&self, request: &CompletionRequest) -> Result<String> {
        let body = OpenAiRequest::new(&self.model, self.max_tokens, request);
        let url = self.completions_url();

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            function = %request.function.name,
            "POST {}", url
        );

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AstroError::LlmError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, model = %self.model, "completion service returned non-success status");
            return Err(AstroError::LlmError(format!(
                "OpenAI error ({status}): {error_text}"
            )));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AstroError::LlmError(format!("Failed to parse response: {e}")))?;

        extract_arguments(result, &request.function.name)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create a completion client from config
pub fn create_completion_client(config: &LlmConfig) -> Result<Box<dyn CompletionClient>> {
    Ok(Box::new(OpenAiClient::from_config(config)?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::function_spec;
    use serde_json::json;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system("rules"),
                ChatMessage::user("Level: beginner\nQuestion: What is a nebula?"),
            ],
            function: function_spec(),
            temperature: 0.2,
        }
    }

    #[test]
    fn test_openai_client_from_config() {
        let config = LlmConfig {
            openai_api_key: Some("test-key".to_string()),
            ..Default::default()
        };

        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
        assert_eq!(client.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_from_config_requires_key_for_openai() {
        let config = LlmConfig::default();
        assert!(OpenAiClient::from_config(&config).is_err());
    }

    #[test]
    fn test_ollama_uses_compatible_endpoint() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ollama_url: "http://localhost:11434/".to_string(),
            model: "llama3.1".to_string(),
            ..Default::default()
        };

        let client = OpenAiClient::from_config(&config).unwrap();
        assert!(client.api_key.is_none());
        assert_eq!(
            client.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_forces_function_call() {
        let request = sample_request();
        let body = serde_json::to_value(OpenAiRequest::new("gpt-4o-mini", None, &request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "astroguide_response");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"],
            json!(["answer", "sources"])
        );
        assert_eq!(
            body["tool_choice"],
            json!({"type": "function", "function": {"name": "astroguide_response"}})
        );
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_tool_call_arguments() {
        let response: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "astroguide_response",
                            "arguments": "{\"answer\":\"Hi\",\"sources\":[]}"
                        }
                    }]
                },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let args = extract_arguments(response, "astroguide_response").unwrap();
        assert_eq!(args, "{\"answer\":\"Hi\",\"sources\":[]}");
    }

    #[test]
    fn test_extract_legacy_function_call() {
        let response: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": null,
                    "function_call": {
                        "name": "astroguide_response",
                        "arguments": "{}"
                    }
                },
                "finish_reason": "function_call"
            }]
        }))
        .unwrap();

        assert_eq!(extract_arguments(response, "astroguide_response").unwrap(), "{}");
    }

    #[test]
    fn test_extract_without_call_fails() {
        let response: OpenAiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Plain text answer"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        assert!(extract_arguments(response, "astroguide_response").is_err());

        let empty: OpenAiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(extract_arguments(empty, "astroguide_response").is_err());
    }
}
