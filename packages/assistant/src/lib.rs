#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Role-aware chat assistant for event staff and attendees.
//!
//! The text generation itself is an external LLM service behind the
//! [`providers::ChatProvider`] trait. Google Gemini and any `OpenAI`-compatible
//! server (`OpenAI`, Ollama, vLLM, llama.cpp, LM Studio) are supported. A
//! [`session::ChatSession`] keeps one conversation's history and turns every
//! provider failure into a fallback reply, so a dead network never surfaces
//! as an error to the person asking for help.

pub mod prompt;
pub mod providers;
pub mod session;

use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors that can occur during assistant operations.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP request to the LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The provider didn't answer in time.
    #[error("Provider did not respond within {seconds}s")]
    Timeout {
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// The user message was blank.
    #[error("Message must not be empty")]
    EmptyMessage,
}

/// Who is talking to the assistant. Selects the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    /// Event organizer monitoring the whole venue.
    Admin,
    /// On-site responder handling incidents.
    Responder,
    /// Attendee.
    #[strum(to_string = "invitee", serialize = "user")]
    Invitee,
}
