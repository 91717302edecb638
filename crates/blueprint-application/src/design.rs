//! The SDD flow: requirements material → architect-written SDD → refinement chat.

use std::fmt;
use std::sync::Arc;

use blueprint_core::agent::AssistantClient;
use blueprint_core::artifact::{ArtifactKind, GeneratedArtifact};
use blueprint_core::notifier::UserNotifier;
use blueprint_core::persona::Persona;
use blueprint_core::session::{ConversationSession, Message, OutgoingMessage};
use blueprint_core::{BlueprintError, Result, prompt};

use crate::events::{EventBus, FlowKind, WizardEvent};
use crate::status::FlowStatus;
use crate::wizard::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SddPhase {
    Idle,
    Generating,
    Chatting,
}

impl fmt::Display for SddPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SddPhase::Idle => "idle",
            SddPhase::Generating => "generating",
            SddPhase::Chatting => "chatting",
        };
        f.write_str(s)
    }
}

/// Drives the architect persona.
///
/// Every non-empty assistant reply in the session is a full SDD and
/// replaces the stored artifact.
/// A start or chat dropped before it settles leaves the phase and the SDD
/// as they were.
pub struct DesignFlow {
    client: Arc<dyn AssistantClient>,
    notifier: Arc<dyn UserNotifier>,
    status: FlowStatus<SddPhase>,
    session: Option<ConversationSession>,
    sdd: Option<GeneratedArtifact>,
}

impl DesignFlow {
    pub fn new(client: Arc<dyn AssistantClient>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            client,
            notifier,
            status: FlowStatus::new(FlowKind::Design, SddPhase::Idle),
            session: None,
            sdd: None,
        }
    }

    pub fn phase(&self) -> SddPhase {
        self.status.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn history(&self) -> &[Message] {
        self.session.as_ref().map(|s| s.history()).unwrap_or(&[])
    }

    pub fn sdd(&self) -> Option<&GeneratedArtifact> {
        self.sdd.as_ref()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        self.status.events_mut()
    }

    pub fn accepts_input(&self) -> bool {
        !self.is_busy() && matches!(self.phase(), SddPhase::Idle | SddPhase::Chatting)
    }

    /// Hands the SDD input to the architect and waits for the first draft.
    ///
    /// `source_name` is the file the input came from, if any. On failure the
    /// flow goes back to `Idle` and the user is alerted.
    pub async fn start(&mut self, input: &str, source_name: Option<&str>) -> Result<Outcome> {
        if self.phase() != SddPhase::Idle || self.is_busy() {
            return Err(BlueprintError::invalid_transition("start", self.phase()));
        }
        if input.trim().is_empty() {
            return Err(BlueprintError::invalid_input("SDD input is empty"));
        }
        let kickoff = prompt::sdd_kickoff_prompt(input.trim(), source_name)?;

        let call = self.status.begin(SddPhase::Generating);
        let mut session = ConversationSession::new(Persona::Architect, self.client.clone());
        let result = session.send(OutgoingMessage::text(kickoff)).await;
        call.settle();

        match result {
            Ok(reply) if !reply.trim().is_empty() => {
                self.session = Some(session);
                self.publish_appended(0);
                self.store_sdd(reply);
                self.status.set_phase(SddPhase::Chatting);
                tracing::info!("[Design] First SDD draft received");
                Ok(Outcome::Completed)
            }
            Ok(_) => {
                self.fail_start(BlueprintError::delivery(None, "assistant returned an empty SDD"));
                Ok(Outcome::Failed)
            }
            Err(e) => {
                self.fail_start(e);
                Ok(Outcome::Failed)
            }
        }
    }

    /// Asks the architect to revise the SDD.
    pub async fn chat(&mut self, text: &str) -> Result<Outcome> {
        if self.phase() != SddPhase::Chatting || self.is_busy() {
            return Err(BlueprintError::invalid_transition("chat", self.phase()));
        }
        if text.trim().is_empty() {
            return Err(BlueprintError::invalid_input("nothing to send"));
        }

        let before = self.history().len();
        let call = self.status.begin(SddPhase::Chatting);
        let result = match self.session.as_mut() {
            Some(session) => session.send(OutgoingMessage::text(text.trim())).await,
            None => Err(BlueprintError::internal("no active design session")),
        };
        call.settle();
        self.publish_appended(before);

        match result {
            Ok(reply) => {
                if !reply.trim().is_empty() {
                    self.store_sdd(reply);
                }
                Ok(Outcome::Completed)
            }
            Err(e) => {
                if e.is_config() {
                    self.notifier.alert(&e.to_string());
                }
                Ok(Outcome::Failed)
            }
        }
    }

    /// Drops the architect session and the SDD and returns to `Idle`.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_busy() || self.phase() == SddPhase::Generating {
            return Err(BlueprintError::invalid_transition("reset", self.phase()));
        }
        self.session = None;
        self.sdd = None;
        self.status.set_phase(SddPhase::Idle);
        self.status.publish(WizardEvent::Reset {
            flow: FlowKind::Design,
        });
        tracing::info!("[Design] Reset");
        Ok(())
    }

    fn fail_start(&mut self, error: BlueprintError) {
        tracing::error!("[Design] SDD generation failed: {}", error);
        self.status.set_phase(SddPhase::Idle);
        self.notifier
            .alert(&format!("Failed to generate the SDD, please try again. ({error})"));
    }

    fn store_sdd(&mut self, reply: String) {
        self.sdd = Some(GeneratedArtifact::new(ArtifactKind::Sdd, reply.trim()));
        self.status.publish(WizardEvent::ArtifactUpdated {
            kind: ArtifactKind::Sdd,
        });
    }

    fn publish_appended(&mut self, from: usize) {
        let appended = self.history()[from..].to_vec();
        for message in appended {
            self.status.publish(WizardEvent::MessageAppended {
                flow: FlowKind::Design,
                role: message.role,
                text: message.text,
            });
        }
    }
}
