use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::docs::ExtractionResult;
use crate::llm::Role;

/// One message in a conversation. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Document attached to this turn, for user turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionResult>,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>, extraction: Option<ExtractionResult>) -> Self {
        Self::new(Role::User, text.into(), extraction)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into(), None)
    }

    fn new(role: Role, text: String, extraction: Option<ExtractionResult>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            extraction,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_ids_are_unique() {
        let a = ConversationTurn::user("hi", None);
        let b = ConversationTurn::user("hi", None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
        assert_eq!(ConversationTurn::assistant("yo").role, Role::Assistant);
    }
}
