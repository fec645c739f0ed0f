//! Google Gemini provider implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatProvider, ChatRole};
use crate::AssistantError;

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Generative Language API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Http`] if the HTTP client can't be built.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, AssistantError> {
        Ok(Self {
            api_key,
            model,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

fn build_request<'a>(system_prompt: &'a str, messages: &'a [ChatMessage]) -> GeminiRequest<'a> {
    let contents = messages
        .iter()
        .map(|m| GeminiContent {
            role: Some(match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            }),
            parts: vec![GeminiPart { text: &m.content }],
        })
        .collect();

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system_prompt,
            }],
        },
        contents,
        generation_config: GenerationConfig {
            temperature: 0.7,
            max_output_tokens: 1024,
        },
    }
}

/// Joins the text parts of the first candidate.
fn parse_response(body: &str) -> Result<String, AssistantError> {
    let response: GeminiResponse = serde_json::from_str(body)?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AssistantError::Provider {
            message: "No reply text in Gemini response".to_string(),
        });
    }

    Ok(text)
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let request = build_request(system_prompt, messages);
        let url = format!("{API_BASE}/{}:generateContent", self.model);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: GeminiError = serde_json::from_str(&body).unwrap_or_else(|_| GeminiError {
                error: GeminiErrorDetail {
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
        "gemini"
    }
}
