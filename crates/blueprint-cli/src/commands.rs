//! Parsing of REPL input lines into commands.

use std::path::PathBuf;

/// A slash command as offered by completion and hints.
pub struct CommandSpec {
    pub name: &'static str,
    /// Argument usage shown after `name `, empty when the command takes none.
    pub args: &'static str,
    /// Fixed argument values offered for completion.
    pub choices: &'static [&'static str],
}

const fn spec(
    name: &'static str,
    args: &'static str,
    choices: &'static [&'static str],
) -> CommandSpec {
    CommandSpec {
        name,
        args,
        choices,
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    spec("/attach", "<path>...", &[]),
    spec("/attachments", "", &[]),
    spec("/remove", "<n>", &[]),
    spec("/finish", "<platform>", &["Web", "iOS", "Android", "Desktop"]),
    spec("/sdd", "<requirements>", &[]),
    spec("/sdd-file", "<path>", &[]),
    spec("/ask", "<text>", &[]),
    spec("/show", "prd|diagram|sdd", &["prd", "diagram", "sdd"]),
    spec("/html", "prd|sdd", &["prd", "sdd"]),
    spec("/url", "", &[]),
    spec("/png", "", &[]),
    spec("/export", "", &[]),
    spec("/reset", "", &[]),
    spec("/reset-sdd", "", &[]),
    spec("/help", "", &[]),
];

/// Looks up a command by its exact name.
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub const HELP_TEXT: &str = "\
Consultation
  <text>                 describe your idea, then answer the consultant
  /attach <path>...      attach images to the next message
  /attachments           list pending attachments
  /remove <n>            drop pending attachment n
  /finish <platform>     end the interview and generate the PRD and diagram
  /reset                 start over

Design document
  /sdd <text>            draft an SDD from the given requirements
  /sdd-file <path>       draft an SDD from a text or markdown file
  /ask <text>            ask the architect to revise the SDD
  /reset-sdd             discard the SDD

Artifacts
  /show prd|diagram|sdd  print an artifact
  /html prd|sdd          print an artifact rendered as HTML
  /url                   print the diagram viewer URL
  /png                   download the diagram as architecture.png
  /export                write all artifacts to the output directory

  /help                  this text
  quit | exit            leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactTarget {
    Prd,
    Diagram,
    Sdd,
}

impl ArtifactTarget {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "prd" => Some(ArtifactTarget::Prd),
            "diagram" | "puml" | "uml" => Some(ArtifactTarget::Diagram),
            "sdd" => Some(ArtifactTarget::Sdd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Attach(Vec<PathBuf>),
    Attachments,
    Remove(usize),
    Finish(String),
    Sdd(String),
    SddFile(PathBuf),
    Ask(String),
    Show(ArtifactTarget),
    Html(ArtifactTarget),
    Url,
    Png,
    Export,
    Reset,
    ResetSdd,
    Help,
    Quit,
    /// Recognised command with a bad or missing argument.
    Usage(&'static str),
    Unknown(String),
}

/// Parses one trimmed, non-empty input line.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line == "quit" || line == "exit" {
        return Command::Quit;
    }
    if !line.starts_with('/') {
        return Command::Say(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/attach" if rest.is_empty() => Command::Usage("/attach <path>..."),
        "/attach" => Command::Attach(rest.split_whitespace().map(PathBuf::from).collect()),
        "/attachments" => Command::Attachments,
        "/remove" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Remove(n - 1),
            _ => Command::Usage("/remove <n> (1-based, see /attachments)"),
        },
        "/finish" if rest.is_empty() => Command::Usage("/finish <platform>"),
        "/finish" => Command::Finish(rest.to_string()),
        "/sdd" if rest.is_empty() => Command::Usage("/sdd <requirements>"),
        "/sdd" => Command::Sdd(rest.to_string()),
        "/sdd-file" if rest.is_empty() => Command::Usage("/sdd-file <path>"),
        "/sdd-file" => Command::SddFile(PathBuf::from(rest)),
        "/ask" if rest.is_empty() => Command::Usage("/ask <text>"),
        "/ask" => Command::Ask(rest.to_string()),
        "/show" => ArtifactTarget::parse(rest)
            .map(Command::Show)
            .unwrap_or(Command::Usage("/show prd|diagram|sdd")),
        "/html" => match ArtifactTarget::parse(rest) {
            Some(target @ (ArtifactTarget::Prd | ArtifactTarget::Sdd)) => Command::Html(target),
            _ => Command::Usage("/html prd|sdd"),
        },
        "/url" => Command::Url,
        "/png" => Command::Png,
        "/export" => Command::Export,
        "/reset" => Command::Reset,
        "/reset-sdd" => Command::ResetSdd,
        "/help" => Command::Help,
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_said() {
        assert_eq!(
            parse_command("  做一個記帳 App "),
            Command::Say("做一個記帳 App".to_string())
        );
        assert_eq!(parse_command("exit"), Command::Quit);
    }

    #[test]
    fn test_arguments_are_split_from_the_name() {
        assert_eq!(
            parse_command("/finish   Web and iOS"),
            Command::Finish("Web and iOS".to_string())
        );
        assert_eq!(
            parse_command("/attach a.png  b.jpg"),
            Command::Attach(vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")])
        );
        assert_eq!(parse_command("/remove 2"), Command::Remove(1));
        assert_eq!(parse_command("/show Diagram"), Command::Show(ArtifactTarget::Diagram));
        assert_eq!(parse_command("/html sdd"), Command::Html(ArtifactTarget::Sdd));
    }

    #[test]
    fn test_missing_arguments_yield_usage() {
        assert!(matches!(parse_command("/finish"), Command::Usage(_)));
        assert!(matches!(parse_command("/remove 0"), Command::Usage(_)));
        assert!(matches!(parse_command("/remove x"), Command::Usage(_)));
        assert!(matches!(parse_command("/html diagram"), Command::Usage(_)));
        assert!(matches!(parse_command("/sdd"), Command::Usage(_)));
    }

    #[test]
    fn test_similar_names_do_not_collide() {
        assert_eq!(parse_command("/reset-sdd"), Command::ResetSdd);
        assert_eq!(parse_command("/reset"), Command::Reset);
        assert_eq!(parse_command("/attachments"), Command::Attachments);
        assert_eq!(
            parse_command("/sdd-file notes.md"),
            Command::SddFile(PathBuf::from("notes.md"))
        );
        assert_eq!(parse_command("/nope"), Command::Unknown("/nope".to_string()));
    }

    #[test]
    fn test_every_listed_command_is_recognised() {
        for command in COMMANDS {
            assert!(
                !matches!(parse_command(command.name), Command::Unknown(_)),
                "{} is not handled",
                command.name
            );
        }
        assert_eq!(find_command("/show").unwrap().choices, ["prd", "diagram", "sdd"]);
        assert!(find_command("/sho").is_none());
    }
}
