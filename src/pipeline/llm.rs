//! Model calls: summarise extracted text, or summarise a page image.
//!
//! [`SummaryModel`] is the seam the pipeline talks to. [`ProviderModel`] is
//! the production implementation over two `edgequake-llm` providers, one per
//! model, because the text path uses a cheaper non-vision model.
//!
//! Each call is attempted exactly once. A failure is returned to the caller,
//! which decides whether it is fatal (text path) or just ends the chain
//! (vision path).

use crate::config::SummarizerConfig;
use crate::error::{ModelError, SummarizeError};
use crate::output::ModelReply;
use crate::prompts::{text_user_prompt, SYSTEM_PROMPT, VISION_USER_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The two language-model operations the pipeline needs.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Summarise the full extracted text. No truncation is applied.
    async fn summarize_text(&self, text: &str) -> Result<ModelReply, ModelError>;

    /// Summarise a single rendered page with a vision-capable model.
    async fn summarize_page(&self, image: ImageData) -> Result<ModelReply, ModelError>;
}

/// [`SummaryModel`] backed by `edgequake-llm` providers.
pub struct ProviderModel {
    text: Arc<dyn LLMProvider>,
    vision: Arc<dyn LLMProvider>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

impl ProviderModel {
    pub fn new(
        text: Arc<dyn LLMProvider>,
        vision: Arc<dyn LLMProvider>,
        config: &SummarizerConfig,
    ) -> Self {
        Self {
            text,
            vision,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Build both providers from the environment.
    ///
    /// Fails with [`SummarizeError::ProviderNotConfigured`] when the provider's
    /// API key is absent, so the caller can start without a model and report
    /// the problem on each request instead.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, SummarizeError> {
        let provider = config.provider_name.as_str();

        if let Some(var) = credential_var(provider) {
            let present = std::env::var(var).map(|v| !v.trim().is_empty()).unwrap_or(false);
            if !present {
                return Err(SummarizeError::ProviderNotConfigured {
                    provider: provider.to_string(),
                    hint: format!("Set {var} and restart the server."),
                });
            }
        }

        let text = create_provider(provider, &config.text_model)?;
        let vision = create_provider(provider, &config.vision_model)?;
        info!(
            "LLM provider '{}' ready: text={}, vision={}",
            provider, config.text_model, config.vision_model
        );
        Ok(Self::new(text, vision, config))
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }

    async fn call(
        &self,
        provider: &Arc<dyn LLMProvider>,
        messages: Vec<ChatMessage>,
        kind: &str,
    ) -> Result<ModelReply, ModelError> {
        let start = Instant::now();
        let options = self.options();

        match provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                debug!(
                    "{} call: {} input tokens, {} output tokens, {:?}",
                    kind,
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(ModelReply {
                    content: response.content,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                })
            }
            Err(e) => {
                warn!("{} call failed after {:?}: {}", kind, start.elapsed(), e);
                Err(ModelError::Api {
                    message: e.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl SummaryModel for ProviderModel {
    async fn summarize_text(&self, text: &str) -> Result<ModelReply, ModelError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(text_user_prompt(text)),
        ];
        self.call(&self.text, messages, "Text summary").await
    }

    async fn summarize_page(&self, image: ImageData) -> Result<ModelReply, ModelError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user_with_images(VISION_USER_PROMPT, vec![image]),
        ];
        self.call(&self.vision, messages, "Vision summary").await
    }
}

/// Environment variable holding the API key for a hosted provider.
///
/// Local providers (ollama, lmstudio) need none.
fn credential_var(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        _ => None,
    }
}

fn create_provider(provider: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SummarizeError> {
    ProviderFactory::create_llm_provider(provider, model).map_err(|e| {
        SummarizeError::ProviderNotConfigured {
            provider: provider.to_string(),
            hint: format!("{e}"),
        }
    })
}
