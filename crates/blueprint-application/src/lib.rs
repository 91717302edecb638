//! Use cases for Blueprint: the consultation and design flows, the artifact
//! generation pipeline, and the wizard that ties them together.

pub mod consultation;
pub mod design;
pub mod events;
pub mod orchestrator;
mod status;
pub mod wizard;

pub use consultation::{ConsultPhase, ConsultationFlow};
pub use design::{DesignFlow, SddPhase};
pub use events::{EventBus, FlowKind, WizardEvent};
pub use orchestrator::{GeneratedArtifacts, GenerationOrchestrator};
pub use wizard::{Outcome, Wizard};
