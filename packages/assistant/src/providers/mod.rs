//! LLM provider abstraction and implementations.
//!
//! Supports Google Gemini and `OpenAI`-compatible servers via a common trait.

pub mod gemini;
pub mod openai;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::AssistantError;

/// Default HTTP timeout for provider requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    /// The person using the app.
    User,
    /// The assistant.
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the conversation and returns the reply text.
    ///
    /// `messages` starts with a user message and alternates roles.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError`] if the request fails.
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Stand-in used when no provider could be configured.
///
/// Every call fails with the configuration error captured at startup, so
/// sessions fall back to the offline reply.
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    /// Creates a stand-in that reports `reason` on every call.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for Unconfigured {
    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        Err(AssistantError::Config {
            message: self.reason.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `GOOGLE_API_KEY` set -> Gemini
/// 2. `OPENAI_API_KEY` set -> `OpenAI`
/// 3. `AI_BASE_URL` set -> self-hosted `OpenAI`-compatible server
///
/// `AI_MODEL` overrides the default model of the chosen provider.
///
/// # Errors
///
/// Returns [`AssistantError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn ChatProvider>, AssistantError> {
    let provider = std::env::var("AI_PROVIDER")
        .ok()
        .or_else(detect_provider)
        .ok_or_else(|| AssistantError::Config {
            message: "No AI credentials found. Set GOOGLE_API_KEY, OPENAI_API_KEY or \
                      AI_BASE_URL, or set AI_PROVIDER explicitly."
                .to_string(),
        })?;

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| AssistantError::Config {
                message: "GOOGLE_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL")
                .unwrap_or_else(|_| gemini::DEFAULT_MODEL.to_string());
            Ok(Box::new(gemini::GeminiProvider::new(
                api_key,
                model,
                DEFAULT_REQUEST_TIMEOUT,
            )?))
        }
        "openai" | "gpt" => {
            let base_url = std::env::var("AI_BASE_URL").ok();
            let api_key = std::env::var("OPENAI_API_KEY").ok();
            if base_url.is_none() && api_key.is_none() {
                return Err(AssistantError::Config {
                    message: "OPENAI_API_KEY environment variable not set".to_string(),
                });
            }
            let model = std::env::var("AI_MODEL")
                .unwrap_or_else(|_| openai::DEFAULT_MODEL.to_string());
            Ok(Box::new(openai::OpenAiCompatibleProvider::new(
                base_url.as_deref().unwrap_or(openai::DEFAULT_BASE_URL),
                api_key,
                model,
                DEFAULT_REQUEST_TIMEOUT,
            )?))
        }
        other => Err(AssistantError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini' or 'openai'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name that matches the arms in
/// [`create_provider_from_env`].
fn detect_provider() -> Option<String> {
    if std::env::var("GOOGLE_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GOOGLE_API_KEY found)");
        return Some("gemini".to_string());
    }

    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return Some("openai".to_string());
    }

    if std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible server (AI_BASE_URL found)");
        return Some("openai".to_string());
    }

    log::warn!(
        "No AI credentials detected. Set one of: GOOGLE_API_KEY, OPENAI_API_KEY \
         or AI_BASE_URL. You can also set AI_PROVIDER explicitly."
    );
    None
}
