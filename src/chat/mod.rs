pub mod context;
pub mod turn;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ContextPolicy;
use crate::docs::ExtractionResult;
use crate::error::{Advisory, ChatError, DispatchError};
use crate::llm::{CompletionEndpoint, CompletionRequest, Message, Role};

pub use turn::ConversationTurn;

/// Builds bounded requests from a conversation and sends them upstream.
/// Holds no conversation state; concurrent calls are independent.
pub struct Dispatcher {
    endpoint: Arc<dyn CompletionEndpoint>,
    model: String,
    policy: ContextPolicy,
}

impl Dispatcher {
    pub fn new(
        endpoint: Arc<dyn CompletionEndpoint>,
        model: impl Into<String>,
        policy: ContextPolicy,
    ) -> Self {
        Self {
            endpoint,
            model: model.into(),
            policy,
        }
    }

    pub fn policy(&self) -> &ContextPolicy {
        &self.policy
    }

    /// Assemble the outgoing request: the last `history_window` turns
    /// followed by the new user message.
    pub fn build_request(
        &self,
        history: &[ConversationTurn],
        text: &str,
        extraction: Option<&ExtractionResult>,
    ) -> Result<CompletionRequest, ChatError> {
        if text.trim().is_empty() && extraction.is_none() {
            return Err(ChatError::Validation);
        }

        let preview_chars = self.policy.preview_chars;
        let mut messages: Vec<Message> = context::window(history, self.policy.history_window)
            .iter()
            .map(|turn| context::to_message(turn, preview_chars))
            .collect();
        messages.push(Message {
            role: Role::User,
            content: context::user_content(text, extraction, preview_chars),
        });

        Ok(CompletionRequest {
            model: self.model.clone(),
            messages,
        })
    }

    /// Send one user submission and return the assistant's reply as a new
    /// turn. `history` is only read; appending is the caller's job.
    pub async fn dispatch(
        &self,
        history: &[ConversationTurn],
        text: &str,
        extraction: Option<&ExtractionResult>,
    ) -> Result<ConversationTurn, DispatchError> {
        let request = self.build_request(history, text, extraction)?;
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            dropped = history.len().saturating_sub(self.policy.history_window),
            chars = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Dispatching completion request"
        );

        match self.endpoint.complete(&request).await {
            Ok(content) => {
                info!(answer_len = content.len(), "Completion resolved");
                Ok(ConversationTurn::assistant(content))
            }
            Err(error) => {
                let advisory = extraction
                    .filter(|e| e.total_page_count > self.policy.oversized_page_threshold)
                    .map(|e| Advisory::OversizedDocument {
                        source_name: e.source_name.clone(),
                        total_page_count: e.total_page_count,
                    });
                warn!(error = %error, "Completion failed");
                if let Some(advisory) = &advisory {
                    warn!("{}", advisory);
                }
                Err(DispatchError { error, advisory })
            }
        }
    }
}
