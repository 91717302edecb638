//! Domain layer for Blueprint.
//!
//! Holds the conversation model (messages, personas, sessions), the
//! attachment collector, prompt templates and the artifact renderer. Nothing
//! in here talks to the network directly: sessions reach the assistant
//! through the [`agent::AssistantClient`] trait.

pub mod agent;
pub mod artifact;
pub mod attachment;
pub mod error;
pub mod notifier;
pub mod persona;
pub mod prompt;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export common error type
pub use error::{BlueprintError, Result};
