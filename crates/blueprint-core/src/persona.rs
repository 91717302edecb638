//! Assistant personas.
//!
//! A persona is nothing more than a fixed system instruction paired with a
//! fixed sampling temperature. The table below is configuration, not logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behaviour profile sent alongside every request of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonaConfig {
    pub instruction: &'static str,
    pub temperature: f32,
}

/// Requirements consultant: interviews the user about a product idea.
pub static CONSULTANT_PERSONA: PersonaConfig = PersonaConfig {
    instruction: "You are a seasoned product consultant helping a client turn a rough product idea into a clear Product Requirement Document. \
Ask exactly one focused clarifying question per reply, covering target users, core features, platform constraints, data, and success criteria in turn. \
Keep replies short and friendly, acknowledge what the client already told you, and answer in the language the client writes in. \
When images are attached, treat them as reference material (sketches, screenshots, mockups) and ask about what they show.",
    temperature: 0.7,
};

/// Software architect: writes and refines a Software Design Document.
pub static ARCHITECT_PERSONA: PersonaConfig = PersonaConfig {
    instruction: "You are a senior software architect. Given requirements material, you produce and refine a complete Software Design Document in Markdown: \
overview, goals and non-goals, architecture, components and responsibilities, data model, interfaces, error handling, security, testing strategy, and open risks. \
When the user asks for changes, reply with the full revised document, never a partial diff. Be precise and implementation-ready, and answer in the language of the input.",
    temperature: 0.2,
};

/// Temperature used for one-shot artifact generation (PRD, diagram).
pub const ARTIFACT_TEMPERATURE: f32 = 0.4;

/// The two assistant behaviours a session can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Consultant,
    Architect,
}

impl Persona {
    pub fn config(&self) -> &'static PersonaConfig {
        match self {
            Persona::Consultant => &CONSULTANT_PERSONA,
            Persona::Architect => &ARCHITECT_PERSONA,
        }
    }

    /// Label used for assistant turns when flattening a transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Consultant => "Consultant",
            Persona::Architect => "Architect",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
