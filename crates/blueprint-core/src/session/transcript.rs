use super::message::{Message, MessageRole};
use crate::persona::Persona;

/// Flattens a history into the plain-text transcript used by artifact prompts.
///
/// Each message becomes `"{Label}: {text}"`, attachments are noted as
/// `[image: mime]` markers, and messages are separated by a blank line.
/// Turns whose request failed are left out.
pub fn flatten_transcript(persona: Persona, messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|message| !message.failed_turn)
        .map(|message| {
            let label = match message.role {
                MessageRole::User => "User",
                MessageRole::Assistant => persona.label(),
            };
            let mut block = format!("{label}: {}", message.text.trim());
            for attachment in &message.attachments {
                block.push_str(&format!(" [image: {}]", attachment.mime_type));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::ImageAttachment;

    #[test]
    fn test_flatten_labels_and_separators() {
        let messages = vec![
            Message::user("I want a budgeting app", vec![]),
            Message::assistant("Who is it for?"),
        ];
        assert_eq!(
            flatten_transcript(Persona::Consultant, &messages),
            "User: I want a budgeting app\n\nConsultant: Who is it for?"
        );
    }

    #[test]
    fn test_flatten_marks_attachments() {
        let messages = vec![Message::user(
            "see sketch",
            vec![ImageAttachment::from_bytes("image/png", b"1")],
        )];
        assert_eq!(
            flatten_transcript(Persona::Architect, &messages),
            "User: see sketch [image: image/png]"
        );
    }

    #[test]
    fn test_flatten_skips_failed_turns() {
        let mut lost = Message::user("lost", vec![]);
        lost.failed_turn = true;
        let messages = vec![
            lost,
            Message::fallback(&crate::error::BlueprintError::delivery(None, "x")),
            Message::user("kept", vec![]),
        ];
        assert_eq!(flatten_transcript(Persona::Consultant, &messages), "User: kept");
    }

    #[test]
    fn test_flatten_empty_history() {
        assert_eq!(flatten_transcript(Persona::Consultant, &[]), "");
    }
}
