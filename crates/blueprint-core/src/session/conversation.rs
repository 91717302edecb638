//! A single multi-turn dialogue with one persona.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::message::Message;
use crate::agent::{AssistantClient, GenerationRequest, RequestTurn};
use crate::attachment::ImageAttachment;
use crate::error::{BlueprintError, Result};
use crate::persona::Persona;

/// Shown in the history when the assistant replied with no text.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(no response)";

/// Lifecycle of a session between sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Awaiting,
    LastTurnErrored,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Ready => "ready",
            SessionState::Awaiting => "awaiting",
            SessionState::LastTurnErrored => "last-turn-errored",
        };
        f.write_str(s)
    }
}

/// Content of one user turn: text, images, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub attachments: Vec<ImageAttachment>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<ImageAttachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachments.is_empty()
    }
}

/// One ongoing exchange with a persona.
///
/// `send` takes `&mut self`, so a session can never have two requests in
/// flight. Every settled send appends exactly two messages: the user turn
/// and either the reply or a fallback notice.
pub struct ConversationSession {
    id: String,
    persona: Persona,
    history: Vec<Message>,
    state: SessionState,
    client: Arc<dyn AssistantClient>,
}

impl ConversationSession {
    pub fn new(persona: Persona, client: Arc<dyn AssistantClient>) -> Self {
        let id = Uuid::new_v4().to_string();
        tracing::debug!("[Session] Created {} session {}", persona, id);
        Self {
            id,
            persona,
            history: Vec::new(),
            state: SessionState::Ready,
            client,
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sends one user turn and returns the assistant's reply text.
    ///
    /// The returned text may be empty; the history then records
    /// [`EMPTY_REPLY_PLACEHOLDER`] instead. On failure the user turn and a
    /// fallback assistant message are appended, both marked as failed so
    /// they are left out of later requests, and the error is returned.
    pub async fn send(&mut self, content: OutgoingMessage) -> Result<String> {
        if content.is_empty() {
            return Err(BlueprintError::invalid_input(
                "message must contain text or at least one attachment",
            ));
        }
        if self.state == SessionState::Awaiting {
            tracing::warn!("[Session] {} had an abandoned request; continuing", self.id);
        }

        let mut user = Message::user(content.text, content.attachments);
        let contents = self
            .history
            .iter()
            .filter(|m| !m.failed_turn)
            .chain(std::iter::once(&user))
            .map(RequestTurn::from)
            .collect();
        let request = GenerationRequest::for_persona(self.persona.config(), contents);

        self.state = SessionState::Awaiting;
        tracing::debug!(
            "[Session] {} sending turn {} via {}",
            self.id,
            self.history.len() / 2 + 1,
            self.client.name()
        );

        match self.client.generate(request).await {
            Ok(reply) => {
                let shown = if reply.trim().is_empty() {
                    EMPTY_REPLY_PLACEHOLDER.to_string()
                } else {
                    reply.clone()
                };
                self.history.extend([user, Message::assistant(shown)]);
                self.state = SessionState::Ready;
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("[Session] {} turn failed: {}", self.id, e);
                user.failed_turn = true;
                self.history.extend([user, Message::fallback(&e)]);
                self.state = SessionState::LastTurnErrored;
                Err(e)
            }
        }
    }

    /// Drops the whole history and returns to `Ready`.
    pub fn clear(&mut self) {
        self.history = Vec::new();
        self.state = SessionState::Ready;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;
    use crate::testing::ScriptedAssistant;

    fn session_with(assistant: &Arc<ScriptedAssistant>) -> ConversationSession {
        ConversationSession::new(Persona::Consultant, assistant.clone())
    }

    #[tokio::test]
    async fn test_successful_sends_alternate_roles() {
        let assistant = Arc::new(ScriptedAssistant::new([
            Ok("Who are the users?".to_string()),
            Ok("Which platform?".to_string()),
            Ok("Anything else?".to_string()),
        ]));
        let mut session = session_with(&assistant);

        for text in ["idea", "students", "mobile"] {
            session.send(OutgoingMessage::text(text)).await.unwrap();
        }

        let history = session.history();
        assert_eq!(history.len(), 6);
        for (i, message) in history.iter().enumerate() {
            let expected = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            assert_eq!(message.role, expected);
        }
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_failed_send_appends_user_and_fallback() {
        let assistant = Arc::new(ScriptedAssistant::new([Err(BlueprintError::delivery(
            Some(500),
            "boom",
        ))]));
        let mut session = session_with(&assistant);

        let result = session.send(OutgoingMessage::text("hello")).await;

        assert!(result.unwrap_err().is_delivery());
        assert_eq!(session.history().len(), 2);
        assert!(session.history()[0].is_user());
        assert!(session.history()[1].text.starts_with(crate::session::message::FALLBACK_PREFIX));
        assert_eq!(session.state(), SessionState::LastTurnErrored);
    }

    #[tokio::test]
    async fn test_failed_turn_is_excluded_from_next_request() {
        let assistant = Arc::new(ScriptedAssistant::new([
            Err(BlueprintError::delivery(None, "offline")),
            Ok("back online".to_string()),
        ]));
        let mut session = session_with(&assistant);

        let _ = session.send(OutgoingMessage::text("first")).await;
        session.send(OutgoingMessage::text("second")).await.unwrap();

        let requests = assistant.requests();
        assert_eq!(requests[1].contents.len(), 1);
        assert_eq!(session.history().len(), 4);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_history_is_sent_with_persona_config() {
        let assistant = Arc::new(ScriptedAssistant::new([
            Ok("q1".to_string()),
            Ok("q2".to_string()),
        ]));
        let mut session = session_with(&assistant);

        session.send(OutgoingMessage::text("a")).await.unwrap();
        session.send(OutgoingMessage::text("b")).await.unwrap();

        let requests = assistant.requests();
        assert_eq!(requests[1].contents.len(), 3);
        assert_eq!(requests[1].temperature, Persona::Consultant.config().temperature);
        assert_eq!(
            requests[1].system_instruction.as_deref(),
            Some(Persona::Consultant.config().instruction)
        );
    }

    #[tokio::test]
    async fn test_empty_reply_gets_placeholder_in_history() {
        let assistant = Arc::new(ScriptedAssistant::new([Ok(String::new())]));
        let mut session = session_with(&assistant);

        let reply = session.send(OutgoingMessage::text("hi")).await.unwrap();

        assert_eq!(reply, "");
        assert_eq!(session.history()[1].text, EMPTY_REPLY_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_appending() {
        let assistant = Arc::new(ScriptedAssistant::new([]));
        let mut session = session_with(&assistant);

        let result = session.send(OutgoingMessage::text("   ")).await;

        assert!(matches!(result, Err(BlueprintError::InvalidInput(_))));
        assert!(session.history().is_empty());
        assert!(assistant.requests().is_empty());
    }

    #[tokio::test]
    async fn test_image_only_message_is_accepted() {
        let assistant = Arc::new(ScriptedAssistant::new([Ok("nice sketch".to_string())]));
        let mut session = session_with(&assistant);
        let image = ImageAttachment::from_bytes("image/png", b"png");

        session
            .send(OutgoingMessage::default().with_attachments(vec![image.clone()]))
            .await
            .unwrap();

        assert_eq!(session.history()[0].attachments, vec![image]);
    }
}
