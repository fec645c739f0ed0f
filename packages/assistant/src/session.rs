//! Per-conversation chat state.

use std::time::Duration;

use crate::prompt::{SafetySnapshot, build_system_prompt};
use crate::providers::{ChatMessage, ChatProvider, ChatRole};
use crate::{AssistantError, UserRole};

/// First message of every conversation.
pub const GREETING: &str = "Hi! How can I help you today?";

/// Reply shown when the provider can't be reached.
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting right now. \
Please try again in a moment, or contact the nearest staff member if you need help urgently.";

/// Most messages sent to the provider per request.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// The assistant's answer to one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Text to show the user.
    pub text: String,
    /// `true` when `text` is [`FALLBACK_REPLY`] because the provider failed.
    pub degraded: bool,
}

/// One conversation between a user and the assistant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    role: UserRole,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Starts a conversation with the greeting already in the transcript.
    #[must_use]
    pub fn new(role: UserRole) -> Self {
        Self {
            role,
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    /// Role the session was opened with.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Full transcript, greeting first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `text` to `provider` and records the exchange.
    ///
    /// Provider errors and timeouts don't fail the call: they are logged and
    /// the reply is [`FALLBACK_REPLY`] with `degraded` set.
    ///
    /// # Errors
    ///
    /// * [`AssistantError::EmptyMessage`] if `text` is blank. Nothing is
    ///   recorded in that case.
    pub async fn ask(
        &mut self,
        provider: &dyn ChatProvider,
        text: &str,
        snapshot: &SafetySnapshot,
        timeout: Duration,
    ) -> Result<AssistantReply, AssistantError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        self.messages.push(ChatMessage::user(text));

        let system_prompt = build_system_prompt(self.role, snapshot);
        let history = self.history();

        let result = match tokio::time::timeout(timeout, provider.complete(&system_prompt, history))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AssistantError::Timeout {
                seconds: timeout.as_secs(),
            }),
        };

        let reply = match result {
            Ok(text) => AssistantReply {
                text,
                degraded: false,
            },
            Err(e) => {
                log::warn!(
                    "Assistant provider '{}' failed for {} session: {e}",
                    provider.name(),
                    self.role
                );
                AssistantReply {
                    text: FALLBACK_REPLY.to_string(),
                    degraded: true,
                }
            }
        };

        self.messages.push(ChatMessage::assistant(reply.text.clone()));
        Ok(reply)
    }

    /// The tail of the transcript sent to the provider.
    ///
    /// At most [`MAX_HISTORY_MESSAGES`] messages, always starting at a user
    /// message so the greeting and any cut-off reply are left out.
    fn history(&self) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(MAX_HISTORY_MESSAGES);
        let tail = &self.messages[start..];
        let first_user = tail
            .iter()
            .position(|m| m.role == ChatRole::User)
            .unwrap_or(tail.len());
        &tail[first_user..]
    }
}
