//! Conversation session module.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `conversation`: One dialogue with a persona (`ConversationSession`)
//! - `transcript`: Flattening a history into prompt text

mod conversation;
mod message;
mod transcript;

// Re-export public API
pub use conversation::{
    ConversationSession, EMPTY_REPLY_PLACEHOLDER, OutgoingMessage, SessionState,
};
pub use message::{FALLBACK_PREFIX, Message, MessageRole};
pub use transcript::flatten_transcript;
