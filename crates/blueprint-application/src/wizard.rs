//! Top-level controller owning both flows.

use std::sync::Arc;

use tokio::sync::mpsc;

use blueprint_core::agent::AssistantClient;
use blueprint_core::artifact::ArtifactRenderer;
use blueprint_core::notifier::UserNotifier;

use crate::consultation::ConsultationFlow;
use crate::design::DesignFlow;
use crate::events::WizardEvent;

/// Result of an action that made an assistant call.
///
/// Failures have already been reported to the user (as a fallback chat
/// message or an alert) by the time this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

/// Owns the consultation flow and the design flow.
///
/// The two flows share nothing but the assistant client, so both can have
/// a request in flight at once; see [`Wizard::flows_mut`].
pub struct Wizard {
    consultation: ConsultationFlow,
    design: DesignFlow,
    renderer: ArtifactRenderer,
}

impl Wizard {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        notifier: Arc<dyn UserNotifier>,
        renderer: ArtifactRenderer,
    ) -> Self {
        Self {
            consultation: ConsultationFlow::new(client.clone(), notifier.clone()),
            design: DesignFlow::new(client, notifier),
            renderer,
        }
    }

    /// Registers a subscriber that receives events from both flows.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WizardEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.consultation.events_mut().add(tx.clone());
        self.design.events_mut().add(tx);
        rx
    }

    pub fn consultation(&self) -> &ConsultationFlow {
        &self.consultation
    }

    pub fn consultation_mut(&mut self) -> &mut ConsultationFlow {
        &mut self.consultation
    }

    pub fn design(&self) -> &DesignFlow {
        &self.design
    }

    pub fn design_mut(&mut self) -> &mut DesignFlow {
        &mut self.design
    }

    /// Both flows at once, for driving them concurrently.
    pub fn flows_mut(&mut self) -> (&mut ConsultationFlow, &mut DesignFlow) {
        (&mut self.consultation, &mut self.design)
    }

    /// Viewer URL of the generated diagram, or `""` when there is none.
    pub fn diagram_url(&self) -> String {
        self.consultation
            .artifacts()
            .map(|a| self.renderer.to_diagram_url(&a.diagram.content))
            .unwrap_or_default()
    }

    pub fn prd_html(&self) -> Option<String> {
        self.consultation
            .artifacts()
            .map(|a| ArtifactRenderer::to_html(&a.prd.content))
    }

    pub fn sdd_html(&self) -> Option<String> {
        self.design.sdd().map(|a| ArtifactRenderer::to_html(&a.content))
    }
}
