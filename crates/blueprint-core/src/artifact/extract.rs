use crate::error::BlueprintError;

pub const DIAGRAM_OPEN: &str = "@startuml";
pub const DIAGRAM_CLOSE: &str = "@enduml";

/// Pulls the diagram source out of a noisy assistant reply.
///
/// 1. If `@startuml` is followed somewhere by `@enduml`, returns that span,
///    both delimiters included.
/// 2. Otherwise strips a surrounding Markdown code fence.
/// 3. Otherwise returns the trimmed text unchanged.
///
/// Never fails: a reply without delimiters is only logged.
pub fn extract_diagram(raw: &str) -> String {
    if let Some(start) = raw.find(DIAGRAM_OPEN) {
        let after_open = start + DIAGRAM_OPEN.len();
        if let Some(offset) = raw[after_open..].find(DIAGRAM_CLOSE) {
            let end = after_open + offset + DIAGRAM_CLOSE.len();
            return raw[start..end].to_string();
        }
    }

    tracing::debug!(
        "[Extract] {}",
        BlueprintError::malformed("diagram delimiters not found, falling back to fence stripping")
    );
    strip_code_fence(raw)
}

/// Removes a leading ```` ```lang ```` line and a trailing ```` ``` ````,
/// then trims. Text without a fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag along with the opening fence line.
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        if let Some(inner) = text.trim_end().strip_suffix("```") {
            text = inner;
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_delimited_block_and_drops_noise() {
        let raw = "Here is your diagram:\n```plantuml\n@startuml\nA -> B\n@enduml\n```\nHope it helps!";
        assert_eq!(extract_diagram(raw), "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_extraction_uses_first_close_after_open() {
        let raw = "@enduml noise @startuml\nX\n@enduml tail @enduml";
        assert_eq!(extract_diagram(raw), "@startuml\nX\n@enduml");
    }

    #[test]
    fn test_falls_back_to_fence_stripping() {
        let raw = "```plantuml\n  component App\n```";
        assert_eq!(extract_diagram(raw), "component App");
    }

    #[test]
    fn test_open_without_close_falls_back() {
        let raw = "```\n@startuml\nA -> B\n```";
        assert_eq!(extract_diagram(raw), "@startuml\nA -> B");
    }

    #[test]
    fn test_plain_text_is_returned_trimmed() {
        assert_eq!(extract_diagram("  just words \n"), "just words");
    }

    #[test]
    fn test_strip_fence_without_language() {
        assert_eq!(strip_code_fence("```\nbody\n```"), "body");
    }

    #[test]
    fn test_single_line_fence_keeps_its_content() {
        // A one-line ```x``` is a code span, so `x` is content, not a language tag.
        assert_eq!(strip_code_fence("```plantuml```"), "plantuml");
        assert_eq!(strip_code_fence("```A -> B```"), "A -> B");
    }
}
