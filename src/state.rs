use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::chat::{ConversationTurn, Dispatcher};
use crate::config::{ChatConfig, ContextPolicy};
use crate::docs::{self, DocumentUpload};
use crate::error::{ChatError, DispatchError};
use crate::llm::LlmClient;

/// Owns the conversation and lets at most one submission dispatch at a time.
pub struct Session {
    dispatcher: Dispatcher,
    conversation: RwLock<Vec<ConversationTurn>>,
    /// Held for the whole of a submission.
    in_flight: Mutex<()>,
}

impl Session {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            conversation: RwLock::new(Vec::new()),
            in_flight: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let client = LlmClient::new(config)?;
        Ok(Self::new(Dispatcher::new(
            Arc::new(client),
            config.model.clone(),
            config.policy.clone(),
        )))
    }

    pub fn policy(&self) -> &ContextPolicy {
        self.dispatcher.policy()
    }

    /// True while a submission is between ingest and reply.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Ingest the upload (if any), dispatch, and on success append the user
    /// turn and the reply. On failure the conversation is left as it was.
    pub async fn submit(
        &self,
        text: &str,
        upload: Option<DocumentUpload>,
    ) -> Result<ConversationTurn, DispatchError> {
        let _guard = self.in_flight.try_lock().map_err(|_| ChatError::Busy)?;

        let extraction = match upload {
            Some(upload) => Some(docs::ingest(&upload, self.policy().page_ceiling).await?),
            None => None,
        };

        let recent = {
            let conversation = self.conversation.read().await;
            let start = conversation
                .len()
                .saturating_sub(self.policy().history_window);
            conversation[start..].to_vec()
        };

        let reply = self
            .dispatcher
            .dispatch(&recent, text, extraction.as_ref())
            .await?;

        let mut conversation = self.conversation.write().await;
        conversation.push(ConversationTurn::user(text, extraction));
        conversation.push(reply.clone());
        info!(turns = conversation.len(), "Conversation updated");
        Ok(reply)
    }

    pub async fn turns(&self) -> Vec<ConversationTurn> {
        self.conversation.read().await.clone()
    }

    pub async fn clear(&self) {
        self.conversation.write().await.clear();
    }
}
