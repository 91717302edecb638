//! Conversation message types.

use serde::{Deserialize, Serialize};

use crate::attachment::ImageAttachment;
use crate::error::BlueprintError;

/// Leading text of the assistant message recorded for a failed turn.
pub const FALLBACK_PREFIX: &str = "Sorry, something went wrong";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the assistant persona.
    Assistant,
}

/// A single message in a conversation history.
///
/// Messages are never edited once they are part of a session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The text content of the message.
    pub text: String,
    /// Images sent with the message, in the order they were attached.
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Set on both messages of a turn whose request failed.
    #[serde(default)]
    pub failed_turn: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, attachments: Vec<ImageAttachment>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            attachments,
            timestamp: chrono::Utc::now().to_rfc3339(),
            failed_turn: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
            attachments: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            failed_turn: false,
        }
    }

    /// The assistant-side notice recorded in place of a missing reply.
    pub fn fallback(error: &BlueprintError) -> Self {
        Self {
            failed_turn: true,
            ..Self::assistant(format!("{FALLBACK_PREFIX}: {error}"))
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
