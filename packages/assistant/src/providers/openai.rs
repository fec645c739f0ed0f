//! `OpenAI`-compatible chat completions provider.
//!
//! Works against the hosted `OpenAI` API as well as self-hosted servers that
//! speak the same `/chat/completions` protocol.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatProvider};
use crate::AssistantError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// `OpenAI`-compatible API provider.
pub struct OpenAiCompatibleProvider {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Creates a new provider for the server at `base_url`.
    ///
    /// `api_key` may be omitted for local servers that don't check it.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Http`] if the HTTP client can't be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        Ok(Self {
            endpoint: completions_endpoint(base_url),
            api_key,
            model,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

/// Appends `/chat/completions` to a base URL, tolerating a trailing slash.
fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request<'a>(
    model: &'a str,
    system_prompt: &'a str,
    messages: &'a [ChatMessage],
) -> OpenAiRequest<'a> {
    let mut api_messages = vec![OpenAiMessage {
        role: "system",
        content: system_prompt,
    }];
    api_messages.extend(messages.iter().map(|m| OpenAiMessage {
        role: m.role.as_ref(),
        content: &m.content,
    }));

    OpenAiRequest {
        model,
        messages: api_messages,
        temperature: 0.7,
        max_tokens: 1024,
    }
}

/// Extracts the reply text from a successful response body.
fn parse_response(body: &str) -> Result<String, AssistantError> {
    let response: OpenAiResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AssistantError::Provider {
            message: "No reply text in OpenAI response".to_string(),
        })
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let request = build_request(&self.model, system_prompt, messages);

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }

        let resp = builder.json(&request).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: OpenAiError = serde_json::from_str(&body).unwrap_or_else(|_| OpenAiError {
                error: OpenAiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AssistantError::Provider {
                message: err.error.message,
            });
        }

        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
