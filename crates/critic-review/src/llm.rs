use std::time::Duration;

use critic_core::{CriticError, LlmConfig, LoadedFile};
use serde::{Deserialize, Serialize};

use crate::prompt;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// A message in a chat conversation with an OpenAI-compatible model.
///
/// # Examples
///
/// ```
/// use critic_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use critic_review::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// Wire protocol used to reach the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Generative Language `generateContent`.
    Gemini,
    /// Any `/v1/chat/completions` endpoint: OpenAI, Ollama, vLLM, LiteLLM.
    OpenAi,
}

impl Provider {
    fn from_name(name: &str) -> Result<Self, CriticError> {
        match name {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(CriticError::Config(format!("unknown LLM provider '{other}'"))),
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_BASE_URL,
            Self::OpenAi => OPENAI_BASE_URL,
        }
    }
}

/// Stateless text-completion client used to review one file at a time.
///
/// Temperature, output budget, and the system instruction are fixed for
/// the lifetime of the client.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
/// use critic_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gemini-1.5-flash");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
    provider: Provider,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] for an unknown provider, or
    /// [`CriticError::Review`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, CriticError> {
        let provider = Provider::from_name(&config.provider)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CriticError::Review(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            provider,
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Review one loaded file and return the raw review text.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Review`] on transport errors, non-success
    /// statuses, or a response without text.
    pub async fn review(&self, file: &LoadedFile) -> Result<String, CriticError> {
        let system = prompt::build_system_prompt();
        let user = prompt::build_review_prompt(file);
        tracing::debug!(
            path = %file.path.display(),
            model = %self.config.model,
            prompt_bytes = user.len(),
            "sending review request"
        );
        let text = match self.provider {
            Provider::Gemini => self.generate_content(system, user).await?,
            Provider::OpenAi => {
                let messages = vec![
                    ChatMessage {
                        role: Role::System,
                        content: system,
                    },
                    ChatMessage {
                        role: Role::User,
                        content: user,
                    },
                ];
                self.chat(messages).await?
            }
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(CriticError::Review("model returned empty text".into()));
        }
        Ok(text.to_string())
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
    }

    /// Send a Gemini `generateContent` request.
    async fn generate_content(&self, system: String, user: String) -> Result<String, CriticError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url(),
            self.config.model
        );

        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "role": "user", "parts": [{ "text": user }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
            },
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("x-goog-api-key", api_key);
        }

        let response_body = self.send(request.json(&body)).await?;
        let parsed: GenerateContentResponse = serde_json::from_value(response_body.clone())
            .map_err(|e| CriticError::Review(format!("failed to parse response: {e}")))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(CriticError::Review(format!(
                "unexpected response structure: {response_body}"
            )));
        }
        Ok(text)
    }

    /// Send an OpenAI-compatible chat completion request.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, CriticError> {
        let url = format!("{}/v1/chat/completions", self.base_url());

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_output_tokens,
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response_body = self.send(request.json(&body)).await?;
        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                CriticError::Review(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, CriticError> {
        let response = request
            .send()
            .await
            .map_err(|e| CriticError::Review(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CriticError::Review(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CriticError::Review(format!("failed to parse response: {e}")))
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}
