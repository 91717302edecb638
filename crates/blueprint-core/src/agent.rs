//! The assistant API boundary.
//!
//! Sessions and the generation orchestrator build a [`GenerationRequest`]
//! and hand it to an [`AssistantClient`]. The client is stateless: every
//! request carries the full history it needs.

use async_trait::async_trait;

use crate::attachment::ImageAttachment;
use crate::error::Result;
use crate::persona::PersonaConfig;
use crate::session::{Message, MessageRole};

/// One piece of content within a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

/// A single turn as sent to the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTurn {
    pub role: MessageRole,
    pub parts: Vec<RequestPart>,
}

impl RequestTurn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![RequestPart::Text(text.into())],
        }
    }

    /// Builds a turn from text plus inline images. Blank text is omitted.
    pub fn new(role: MessageRole, text: &str, attachments: &[ImageAttachment]) -> Self {
        let mut parts = Vec::with_capacity(attachments.len() + 1);
        if !text.trim().is_empty() {
            parts.push(RequestPart::Text(text.to_string()));
        }
        parts.extend(attachments.iter().map(|a| RequestPart::InlineData {
            mime_type: a.mime_type.clone(),
            data: a.data.clone(),
        }));
        Self { role, parts }
    }
}

impl From<&Message> for RequestTurn {
    fn from(message: &Message) -> Self {
        Self::new(message.role.clone(), &message.text, &message.attachments)
    }
}

/// Everything the assistant needs to produce one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: Option<String>,
    pub temperature: f32,
    pub contents: Vec<RequestTurn>,
}

impl GenerationRequest {
    /// A one-shot request with no system instruction and no history.
    pub fn one_shot(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            system_instruction: None,
            temperature,
            contents: vec![RequestTurn::user_text(prompt)],
        }
    }

    /// A request bound to a persona, carrying the given turns.
    pub fn for_persona(config: &PersonaConfig, contents: Vec<RequestTurn>) -> Self {
        Self {
            system_instruction: Some(config.instruction.to_string()),
            temperature: config.temperature,
            contents,
        }
    }
}

/// A hosted language model that turns a request into reply text.
///
/// Implementations must fail with `BlueprintError::Config` before touching
/// the network when they have no credential, map every transport or API
/// failure to `BlueprintError::Delivery`, and return an empty string (not
/// an error) when the model produced no text.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
