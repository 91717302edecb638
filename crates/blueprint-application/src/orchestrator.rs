//! Turns a finished consultation into a PRD and an architecture diagram.
//!
//! Generation is a fixed list of named steps run one after another by a
//! small driver loop. Each step is a single non-retried request; the first
//! failure aborts the run and nothing partial is returned.

use std::sync::Arc;

use blueprint_core::agent::{AssistantClient, GenerationRequest};
use blueprint_core::artifact::{ArtifactKind, GeneratedArtifact, extract_diagram};
use blueprint_core::persona::{ARTIFACT_TEMPERATURE, Persona};
use blueprint_core::session::{Message, flatten_transcript};
use blueprint_core::{BlueprintError, Result, prompt};

pub const PRD_PROGRESS: &str = "Generating PRD…";
pub const DIAGRAM_PROGRESS: &str = "Generating architecture diagram…";
pub const DONE_PROGRESS: &str = "Done";

#[derive(Debug, Clone, Copy)]
enum GenerationStep {
    Prd,
    Diagram,
}

const STEPS: [GenerationStep; 2] = [GenerationStep::Prd, GenerationStep::Diagram];

impl GenerationStep {
    fn label(self) -> &'static str {
        match self {
            GenerationStep::Prd => PRD_PROGRESS,
            GenerationStep::Diagram => DIAGRAM_PROGRESS,
        }
    }

    fn kind(self) -> ArtifactKind {
        match self {
            GenerationStep::Prd => ArtifactKind::Prd,
            GenerationStep::Diagram => ArtifactKind::Diagram,
        }
    }

    fn prompt(self, transcript: &str, platform: &str) -> Result<String> {
        match self {
            GenerationStep::Prd => prompt::prd_prompt(transcript, platform),
            GenerationStep::Diagram => prompt::diagram_prompt(transcript, platform),
        }
    }

    fn post_process(self, reply: &str) -> String {
        match self {
            GenerationStep::Prd => reply.trim().to_string(),
            GenerationStep::Diagram => extract_diagram(reply),
        }
    }
}

/// Output of a successful generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub prd: GeneratedArtifact,
    pub diagram: GeneratedArtifact,
}

pub struct GenerationOrchestrator {
    client: Arc<dyn AssistantClient>,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<dyn AssistantClient>) -> Self {
        Self { client }
    }

    /// Runs every step in order, calling `on_progress` with each step's label
    /// before its request and with [`DONE_PROGRESS`] at the end.
    pub async fn generate<F>(
        &self,
        transcript: &[Message],
        target_platform: &str,
        mut on_progress: F,
    ) -> Result<GeneratedArtifacts>
    where
        F: FnMut(&str),
    {
        let transcript = flatten_transcript(Persona::Consultant, transcript);
        let mut prd = None;
        let mut diagram = None;

        for step in STEPS {
            on_progress(step.label());
            tracing::info!("[Orchestrator] {}", step.label());

            let request = step.prompt(&transcript, target_platform)?;
            let reply = self
                .client
                .generate(GenerationRequest::one_shot(request, ARTIFACT_TEMPERATURE))
                .await?;

            let content = step.post_process(&reply);
            if content.is_empty() {
                return Err(BlueprintError::delivery(
                    None,
                    format!("assistant returned an empty {}", step.kind()),
                ));
            }

            let artifact = GeneratedArtifact::new(step.kind(), content);
            match step {
                GenerationStep::Prd => prd = Some(artifact),
                GenerationStep::Diagram => diagram = Some(artifact),
            }
        }

        on_progress(DONE_PROGRESS);
        match (prd, diagram) {
            (Some(prd), Some(diagram)) => Ok(GeneratedArtifacts { prd, diagram }),
            _ => Err(BlueprintError::internal("generation finished without artifacts")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::testing::ScriptedAssistant;

    fn transcript() -> Vec<Message> {
        vec![
            Message::user("做一個記帳 App", vec![]),
            Message::assistant("Who will use it?"),
            Message::user("Students", vec![]),
            Message::assistant("Which platform?"),
        ]
    }

    #[tokio::test]
    async fn test_generates_prd_then_diagram() {
        let assistant = Arc::new(ScriptedAssistant::new([
            Ok("# PRD\n\nBudget app".to_string()),
            Ok("Sure!\n```plantuml\n@startuml\n[App] --> [DB]\n@enduml\n```".to_string()),
        ]));
        let orchestrator = GenerationOrchestrator::new(assistant.clone());
        let mut labels = Vec::new();

        let artifacts = orchestrator
            .generate(&transcript(), "Python", |label| labels.push(label.to_string()))
            .await
            .unwrap();

        assert_eq!(artifacts.prd.content, "# PRD\n\nBudget app");
        assert_eq!(artifacts.diagram.content, "@startuml\n[App] --> [DB]\n@enduml");
        assert_eq!(labels, vec![PRD_PROGRESS, DIAGRAM_PROGRESS, DONE_PROGRESS]);

        let requests = assistant.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.system_instruction.is_none()));
        assert!(requests.iter().all(|r| r.temperature == ARTIFACT_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_first_failure_aborts_before_diagram() {
        let assistant = Arc::new(ScriptedAssistant::new([Err(BlueprintError::delivery(
            Some(503),
            "unavailable",
        ))]));
        let orchestrator = GenerationOrchestrator::new(assistant.clone());
        let mut labels = Vec::new();

        let result = orchestrator
            .generate(&transcript(), "Python", |label| labels.push(label.to_string()))
            .await;

        assert!(result.unwrap_err().is_delivery());
        assert_eq!(assistant.requests().len(), 1);
        assert_eq!(labels, vec![PRD_PROGRESS]);
    }

    #[tokio::test]
    async fn test_empty_prd_is_a_failure() {
        let assistant = Arc::new(ScriptedAssistant::new([Ok("   ".to_string())]));
        let orchestrator = GenerationOrchestrator::new(assistant);

        let result = orchestrator.generate(&transcript(), "Web", |_| {}).await;

        assert!(result.is_err());
    }
}
