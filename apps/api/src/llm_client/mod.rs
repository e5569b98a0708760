/// LLM Client: the single point of entry for all chat-completion calls in prepdeck.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through the `ChatModel` trait defined here.
///
/// The concrete client speaks the OpenAI-compatible `/chat/completions` protocol,
/// so any compatible provider (SambaNova, Groq, ...) works through `OPENAI_API_BASE`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod credential;
pub mod literal;
pub mod normalize;
pub mod parse;
pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Upper bound for any single HTTP exchange; per-task deadlines are shorter.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);
/// Text marker providers put in rate-limit errors.
const RATE_LIMIT_MARKER: &str = "429";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True when the provider signalled a rate limit, either through the HTTP
    /// status or through the "429" marker in the error text.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LlmError::Api { status: 429, .. } => true,
            LlmError::Http(e) if e.status().map(|s| s.as_u16()) == Some(429) => true,
            other => other.to_string().contains(RATE_LIMIT_MARKER),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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

/// One chat-completion exchange: ordered messages, sampling temperature and a deadline.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub timeout: Duration,
}

/// The chat model seam. `AppState` carries an `Arc<dyn ChatModel>` inside the
/// `Generator`; tests swap in scripted models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the text content of the first completion choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(CLIENT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(request.timeout)
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)?;
        completion_text(completion)
    }
}

fn completion_text(completion: CompletionResponse) -> Result<String, LlmError> {
    if let Some(usage) = &completion.usage {
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detected_from_status() {
        let err = LlmError::Api {
            status: 429,
            message: "Too Many Requests".to_string(),
        };
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_detected_from_error_text() {
        assert!(testing::rate_limited().is_rate_limited());
    }

    #[test]
    fn test_other_errors_are_not_rate_limits() {
        let err = LlmError::Api {
            status: 500,
            message: "upstream overloaded".to_string(),
        };
        assert!(!err.is_rate_limited());
        assert!(!LlmError::EmptyContent.is_rate_limited());
        assert!(!LlmError::Timeout(Duration::from_secs(8)).is_rate_limited());
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::system("be terse")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be terse"}));
    }

    #[test]
    fn test_completions_url_tolerates_trailing_slash() {
        let client = OpenAiClient::new(
            "sk-test".to_string(),
            Some("https://api.sambanova.ai/v1/".to_string()),
            DEFAULT_MODEL.to_string(),
        )
        .unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.sambanova.ai/v1/chat/completions"
        );
    }

    #[test]
    fn test_completion_text_takes_first_choice() {
        let completion: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "first"}},
                    {"message": {"role": "assistant", "content": "second"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        )
        .unwrap();
        assert_eq!(completion_text(completion).unwrap(), "first");
    }

    #[test]
    fn test_completion_text_rejects_blank_content() {
        let completion: CompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            completion_text(completion),
            Err(LlmError::EmptyContent)
        ));
    }
}
