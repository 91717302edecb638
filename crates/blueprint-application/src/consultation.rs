//! The consultation flow: idea → interview → PRD + diagram.

use std::fmt;
use std::sync::Arc;

use blueprint_core::agent::AssistantClient;
use blueprint_core::artifact::ArtifactKind;
use blueprint_core::attachment::AttachmentCollector;
use blueprint_core::notifier::UserNotifier;
use blueprint_core::persona::Persona;
use blueprint_core::session::{ConversationSession, Message, OutgoingMessage};
use blueprint_core::{BlueprintError, Result};

use crate::events::{EventBus, FlowKind, WizardEvent};
use crate::orchestrator::{GeneratedArtifacts, GenerationOrchestrator};
use crate::status::FlowStatus;
use crate::wizard::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultPhase {
    Initial,
    Consulting,
    Generating,
    Finished,
}

impl fmt::Display for ConsultPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsultPhase::Initial => "initial",
            ConsultPhase::Consulting => "consulting",
            ConsultPhase::Generating => "generating",
            ConsultPhase::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Drives the consultant persona and the artifact generation that follows.
///
/// Chat failures surface as a fallback message in the history. A failed
/// generation reverts to `Consulting` and raises an alert. A call dropped
/// before it settles leaves the flow in the phase it started from.
pub struct ConsultationFlow {
    client: Arc<dyn AssistantClient>,
    orchestrator: GenerationOrchestrator,
    notifier: Arc<dyn UserNotifier>,
    status: FlowStatus<ConsultPhase>,
    session: Option<ConversationSession>,
    attachments: AttachmentCollector,
    artifacts: Option<GeneratedArtifacts>,
}

impl ConsultationFlow {
    pub fn new(client: Arc<dyn AssistantClient>, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            orchestrator: GenerationOrchestrator::new(client.clone()),
            client,
            notifier,
            status: FlowStatus::new(FlowKind::Consultation, ConsultPhase::Initial),
            session: None,
            attachments: AttachmentCollector::new(),
            artifacts: None,
        }
    }

    pub fn phase(&self) -> ConsultPhase {
        self.status.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    /// Label of the generation step in progress, if any.
    pub fn progress(&self) -> Option<&str> {
        self.status.progress()
    }

    pub fn history(&self) -> &[Message] {
        self.session.as_ref().map(|s| s.history()).unwrap_or(&[])
    }

    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    pub fn artifacts(&self) -> Option<&GeneratedArtifacts> {
        self.artifacts.as_ref()
    }

    pub fn attachments(&self) -> &AttachmentCollector {
        &self.attachments
    }

    /// Pending attachments for the next message. Only meaningful before
    /// generation starts.
    pub fn attachments_mut(&mut self) -> &mut AttachmentCollector {
        &mut self.attachments
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        self.status.events_mut()
    }

    /// Whether free-form input is currently accepted.
    pub fn accepts_input(&self) -> bool {
        !self.is_busy()
            && matches!(self.phase(), ConsultPhase::Initial | ConsultPhase::Consulting)
    }

    /// Sends the initial product idea and opens the consultation.
    pub async fn start(&mut self, idea: &str) -> Result<Outcome> {
        self.require(ConsultPhase::Initial, "start")?;
        let content = self.outgoing(idea)?;

        self.session = Some(ConversationSession::new(Persona::Consultant, self.client.clone()));
        self.status.set_phase(ConsultPhase::Consulting);
        tracing::info!("[Consultation] Started");
        Ok(self.send_turn(content).await)
    }

    /// Answers the consultant's latest question.
    pub async fn reply(&mut self, text: &str) -> Result<Outcome> {
        self.require(ConsultPhase::Consulting, "reply")?;
        let content = self.outgoing(text)?;
        Ok(self.send_turn(content).await)
    }

    /// Ends the interview and generates the PRD and the diagram.
    ///
    /// On failure the phase returns to `Consulting`, no artifact is kept, and
    /// the user is alerted.
    pub async fn finish_and_generate(&mut self, target_platform: &str) -> Result<Outcome> {
        self.require(ConsultPhase::Consulting, "finish")?;
        if self.is_busy() {
            return Err(BlueprintError::invalid_transition("finish", "busy"));
        }
        let target_platform = target_platform.trim();
        if target_platform.is_empty() {
            return Err(BlueprintError::invalid_input("target platform is required"));
        }

        let mut call = self.status.begin(ConsultPhase::Generating);
        self.artifacts = None;

        let history = self.session.as_ref().map(|s| s.history()).unwrap_or(&[]);
        let result = self
            .orchestrator
            .generate(history, target_platform, |label| call.status().set_progress(label))
            .await;
        call.settle();

        match result {
            Ok(artifacts) => {
                self.artifacts = Some(artifacts);
                for kind in [ArtifactKind::Prd, ArtifactKind::Diagram] {
                    self.status.publish(WizardEvent::ArtifactUpdated { kind });
                }
                self.status.set_phase(ConsultPhase::Finished);
                tracing::info!("[Consultation] Artifacts generated for {}", target_platform);
                Ok(Outcome::Completed)
            }
            Err(e) => {
                tracing::error!("[Consultation] Generation failed: {}", e);
                self.status.set_phase(ConsultPhase::Consulting);
                self.notifier
                    .alert(&format!("Failed to generate documents, please try again. ({e})"));
                Ok(Outcome::Failed)
            }
        }
    }

    /// Drops the session, attachments and artifacts and returns to `Initial`.
    pub fn reset(&mut self) -> Result<()> {
        if self.is_busy() || self.phase() == ConsultPhase::Generating {
            return Err(BlueprintError::invalid_transition("reset", self.phase()));
        }
        self.session = None;
        self.attachments.clear();
        self.artifacts = None;
        self.status.set_phase(ConsultPhase::Initial);
        self.status.publish(WizardEvent::Reset {
            flow: FlowKind::Consultation,
        });
        tracing::info!("[Consultation] Reset");
        Ok(())
    }

    fn require(&self, expected: ConsultPhase, action: &str) -> Result<()> {
        if self.phase() != expected {
            return Err(BlueprintError::invalid_transition(action, self.phase()));
        }
        Ok(())
    }

    /// Builds the outgoing message, taking the pending attachments only once
    /// the message is known to be sendable.
    fn outgoing(&mut self, text: &str) -> Result<OutgoingMessage> {
        if self.is_busy() {
            return Err(BlueprintError::invalid_transition("send", "busy"));
        }
        if text.trim().is_empty() && self.attachments.is_empty() {
            return Err(BlueprintError::invalid_input("nothing to send"));
        }
        Ok(OutgoingMessage::text(text.trim()).with_attachments(self.attachments.take()))
    }

    async fn send_turn(&mut self, content: OutgoingMessage) -> Outcome {
        let before = self.history().len();
        let phase = self.phase();
        let call = self.status.begin(phase);
        let result = match self.session.as_mut() {
            Some(session) => session.send(content).await,
            None => Err(BlueprintError::internal("no active consultation session")),
        };
        call.settle();

        let appended = self.history()[before..].to_vec();
        for message in appended {
            self.status.publish(WizardEvent::MessageAppended {
                flow: FlowKind::Consultation,
                role: message.role,
                text: message.text,
            });
        }

        match result {
            Ok(_) => Outcome::Completed,
            Err(e) => {
                if e.is_config() {
                    self.notifier.alert(&e.to_string());
                }
                Outcome::Failed
            }
        }
    }
}
