use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    Primary,
    Secondary,
}

impl ActionVariant {
    /// Anything the backend sends other than "secondary" renders as primary.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("secondary") {
            ActionVariant::Secondary
        } else {
            ActionVariant::Primary
        }
    }
}

/// A button offered under an assistant message; `action` is the tag sent
/// back when it is pressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub action: String,
    pub variant: ActionVariant,
}

impl ActionButton {
    pub fn primary(label: &str, action: &str) -> Self {
        ActionButton {
            label: label.to_string(),
            action: action.to_string(),
            variant: ActionVariant::Primary,
        }
    }

    pub fn secondary(label: &str, action: &str) -> Self {
        ActionButton {
            label: label.to_string(),
            action: action.to_string(),
            variant: ActionVariant::Secondary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionButton>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), Vec::new())
    }

    pub fn assistant_with_actions(content: impl Into<String>, actions: Vec<ActionButton>) -> Self {
        Self::new(Role::Assistant, content.into(), actions)
    }

    fn new(role: Role, content: String, actions: Vec<ActionButton>) -> Self {
        ConversationMessage {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            actions,
        }
    }

    pub fn has_action(&self, tag: &str) -> bool {
        self.actions.iter().any(|a| a.action == tag)
    }
}

impl fmt::Display for ConversationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let speaker = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "[{}] {}: {}", self.timestamp.format("%H:%M:%S"), speaker, self.content)
    }
}
