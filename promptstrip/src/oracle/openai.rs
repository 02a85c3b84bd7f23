//! OpenAI-compatible oracle over chat completions and embeddings.
//!
//! Supports both OpenRouter and OpenAI: when `OPENROUTER_API_KEY` is set the
//! OpenRouter base URL is used, otherwise `OPENAI_API_KEY` against the default
//! OpenAI endpoint. The default credential is resolved once per instance and
//! cached; a per-call credential override builds a plain OpenAI config with
//! that key instead.
//!
//! **Interaction**: Implements [`Oracle`]; injected into `StripeEngine`.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::error::AnalysisError;
use crate::oracle::Oracle;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Completion model used when none is configured.
pub const DEFAULT_COMPLETION_MODEL: &str = "stepfun/step-3.5-flash:free";
/// Embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "thenlper/gte-base";

/// System message for every completion call; keeps sample outputs short and
/// uniform so embeddings compare like with like.
const COMPLETION_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Respond concisely to the user's prompt.";

/// Token cap for sample responses; the execution task asks for 2-3 sentences.
const COMPLETION_MAX_TOKENS: u32 = 500;

/// Real oracle over the OpenAI-compatible API.
pub struct OpenAiOracle {
    completion_model: String,
    embedding_model: String,
    /// Default credential/config, resolved from the environment on first use.
    /// `get_or_try_init` keeps the resolution idempotent under concurrent calls.
    default_config: OnceCell<OpenAIConfig>,
}

/// Reads an env var as a usable key: present and non-blank.
fn read_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl OpenAiOracle {
    /// Builds an oracle with the default completion and embedding models.
    /// The credential is resolved lazily on the first call.
    pub fn new() -> Self {
        Self::with_models(DEFAULT_COMPLETION_MODEL, DEFAULT_EMBEDDING_MODEL)
    }

    /// Builds an oracle with explicit model names.
    pub fn with_models(
        completion_model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            completion_model: completion_model.into(),
            embedding_model: embedding_model.into(),
            default_config: OnceCell::new(),
        }
    }

    /// Default config: OpenRouter when its key is set, else OpenAI. Resolved at
    /// most once per instance; later env changes do not affect a live oracle.
    fn default_config(&self) -> Result<&OpenAIConfig, AnalysisError> {
        self.default_config.get_or_try_init(|| {
            if let Some(key) = read_key(env_config::OPENROUTER_API_KEY_VAR) {
                debug!(base_url = OPENROUTER_BASE_URL, "using OpenRouter credential");
                return Ok(OpenAIConfig::new()
                    .with_api_key(key)
                    .with_api_base(OPENROUTER_BASE_URL));
            }
            if let Some(key) = read_key(env_config::OPENAI_API_KEY_VAR) {
                debug!("using OpenAI credential");
                return Ok(OpenAIConfig::new().with_api_key(key));
            }
            Err(AnalysisError::Credential(format!(
                "set {} or {}",
                env_config::OPENROUTER_API_KEY_VAR,
                env_config::OPENAI_API_KEY_VAR
            )))
        })
    }

    /// Client for one call: per-call credential override when given, otherwise
    /// the cached default config.
    fn resolve_client(
        &self,
        credential: Option<&str>,
    ) -> Result<Client<OpenAIConfig>, AnalysisError> {
        let credential = credential.map(str::trim).filter(|c| !c.is_empty());
        match credential {
            Some(key) => Ok(Client::with_config(OpenAIConfig::new().with_api_key(key))),
            None => Ok(Client::with_config(self.default_config()?.clone())),
        }
    }
}

impl Default for OpenAiOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(
        &self,
        prompt: &str,
        credential: Option<&str>,
    ) -> Result<String, AnalysisError> {
        let client = self.resolve_client(credential)?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                COMPLETION_SYSTEM_PROMPT,
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(prompt)),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.completion_model.clone())
            .messages(messages)
            .max_completion_tokens(COMPLETION_MAX_TOKENS)
            .build()
            .map_err(|e| AnalysisError::Internal(format!("completion request build: {}", e)))?;

        debug!(
            model = %self.completion_model,
            prompt_chars = prompt.len(),
            "oracle completion call"
        );
        if let Ok(js) = serde_json::to_string(&request) {
            trace!(request = %js, "completion request body");
        }

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| AnalysisError::Oracle(format!("completion call: {}", e)))?;

        // No content is a valid (empty) sample response, not an error.
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(content)
    }

    async fn embed(&self, text: &str, credential: Option<&str>) -> Result<Vec<f32>, AnalysisError> {
        let client = self.resolve_client(credential)?;

        let request = CreateEmbeddingRequest {
            model: self.embedding_model.clone(),
            input: EmbeddingInput::String(text.to_string()),
            ..Default::default()
        };

        debug!(model = %self.embedding_model, text_chars = text.len(), "oracle embedding call");

        let response = client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AnalysisError::Oracle(format!("embedding call: {}", e)))?;

        response
            .data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or_else(|| AnalysisError::Oracle("embedding oracle returned no data".to_string()))
    }
}
