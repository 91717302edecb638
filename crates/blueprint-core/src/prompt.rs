//! Prompt templates for artifact generation.
//!
//! Templates are Jinja (minijinja) so the wording can change without
//! touching the code that fills them in.

use minijinja::{Environment, context};

use crate::error::Result;

const PRD_TEMPLATE: &str = r#"You are a product manager. Based on the consultation transcript below, write a complete Product Requirement Document in Markdown.

Target platform / tech stack: {{ platform }}

Include these sections:
1. Product overview and goals
2. Target users and personas
3. User stories
4. Functional requirements (numbered)
5. Non-functional requirements
6. Platform-specific considerations for {{ platform }}
7. Out of scope
8. Open questions

Write in the same language the user used in the transcript. Output only the Markdown document.

--- TRANSCRIPT ---
{{ transcript }}
--- END TRANSCRIPT ---"#;

const DIAGRAM_TEMPLATE: &str = r#"You are a software architect. Based on the consultation transcript below, design a system architecture for an implementation on {{ platform }}.

Express it as a PlantUML component diagram:
- Start with @startuml and end with @enduml.
- Show clients, services, data stores and external integrations, with labelled arrows.
- Use only syntax supported by the public PlantUML server.
- Output only the diagram source, no explanation.

--- TRANSCRIPT ---
{{ transcript }}
--- END TRANSCRIPT ---"#;

const SDD_KICKOFF_TEMPLATE: &str = r#"Below is the material for a new system{% if source_name %} (from "{{ source_name }}"){% endif %}. Write the complete Software Design Document for it.

--- INPUT ---
{{ input }}
--- END INPUT ---"#;

fn render(template: &str, ctx: minijinja::Value) -> Result<String> {
    let env = Environment::new();
    Ok(env.render_str(template, ctx)?)
}

/// Prompt asking for a Markdown PRD.
pub fn prd_prompt(transcript: &str, platform: &str) -> Result<String> {
    render(PRD_TEMPLATE, context! { transcript, platform })
}

/// Prompt asking for a PlantUML architecture diagram.
pub fn diagram_prompt(transcript: &str, platform: &str) -> Result<String> {
    render(DIAGRAM_TEMPLATE, context! { transcript, platform })
}

/// First message of the architect session.
pub fn sdd_kickoff_prompt(input: &str, source_name: Option<&str>) -> Result<String> {
    render(SDD_KICKOFF_TEMPLATE, context! { input, source_name })
}
