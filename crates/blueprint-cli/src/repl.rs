use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::mpsc;

use blueprint_application::{ConsultPhase, Outcome, SddPhase, Wizard, WizardEvent};
use blueprint_core::artifact::GeneratedArtifact;
use blueprint_core::session::Message;
use blueprint_infrastructure::{ArtifactExporter, LocalImageFile, local_file::read_text_file};
use blueprint_interaction::DiagramFetcher;

use crate::commands::{
    ArtifactTarget, COMMANDS, Command, HELP_TEXT, find_command, parse_command,
};

/// Completion candidates for the text before the cursor, with the byte
/// offset they replace from.
fn complete_line(line: &str) -> (usize, Vec<&'static str>) {
    if !line.starts_with('/') {
        return (0, Vec::new());
    }
    match line.split_once(' ') {
        None => {
            let names: Vec<&'static str> = COMMANDS
                .iter()
                .map(|c| c.name)
                .filter(|name| name.starts_with(line))
                .collect();
            (0, names)
        }
        Some((name, arg)) if !arg.contains(' ') => {
            let choices: Vec<&'static str> = find_command(name)
                .map(|c| {
                    c.choices
                        .iter()
                        .copied()
                        .filter(|choice| choice.starts_with(arg))
                        .collect()
                })
                .unwrap_or_default();
            (name.len() + 1, choices)
        }
        Some(_) => (0, Vec::new()),
    }
}

/// Greyed-out text shown after the cursor: the rest of a command name, or
/// the argument usage once the name is complete.
fn hint_line(line: &str) -> Option<String> {
    if !line.starts_with('/') {
        return None;
    }
    match line.split_once(' ') {
        None => COMMANDS
            .iter()
            .find(|c| c.name.starts_with(line) && c.name.len() > line.len())
            .map(|c| c.name[line.len()..].to_string()),
        Some((name, "")) => find_command(name)
            .filter(|c| !c.args.is_empty())
            .map(|c| c.args.to_string()),
        Some(_) => None,
    }
}

/// rustyline helper wired to the command table.
#[derive(Clone)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = complete_line(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let split = line.find(' ').unwrap_or(line.len());
        let (name, rest) = line.split_at(split);
        Owned(format!("{}{}", name.bright_cyan(), rest))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        hint_line(line)
    }
}

impl Validator for CliHelper {}

/// Prints generation progress as it is reported by the flows.
async fn print_events(mut events: mpsc::UnboundedReceiver<WizardEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            WizardEvent::Progress { label } => println!("{}", label.bright_yellow()),
            WizardEvent::ArtifactUpdated { kind } => {
                println!("{}", format!("{kind} updated").bright_black())
            }
            _ => {}
        }
    }
}

fn print_message(author: &str, message: &Message) {
    println!("{}", format!("[{author}]").bright_magenta());
    for line in message.text.lines() {
        if message.failed_turn {
            println!("{}", line.red());
        } else {
            println!("{}", line.bright_blue());
        }
    }
    println!();
}

fn print_artifact(artifact: Option<&GeneratedArtifact>, missing: &str) {
    match artifact {
        Some(artifact) => println!("{}", artifact.content),
        None => println!("{}", missing.bright_black()),
    }
}

pub struct Repl {
    wizard: Wizard,
    exporter: ArtifactExporter,
    fetcher: DiagramFetcher,
}

impl Repl {
    pub fn new(wizard: Wizard, exporter: ArtifactExporter, fetcher: DiagramFetcher) -> Self {
        Self {
            wizard,
            exporter,
            fetcher,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let printer = tokio::spawn(print_events(self.wizard.subscribe()));

        let mut rl = Editor::new()?;
        rl.set_helper(Some(CliHelper));

        println!("{}", "=== Blueprint ===".bright_magenta().bold());
        println!(
            "{}",
            "Describe your product idea to start, '/help' for commands, or 'quit' to exit."
                .bright_black()
        );
        println!();

        // ===== Main REPL Loop =====
        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);

                    let command = parse_command(trimmed);
                    if command == Command::Quit {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    if let Err(e) = self.dispatch(command).await {
                        println!("{}", e.to_string().yellow());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "CTRL-D detected. Exiting...".bright_green());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }

        // Dropping the wizard closes the event channel.
        drop(self);
        let _ = printer.await;
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> blueprint_core::Result<()> {
        match command {
            Command::Say(text) => self.say(&text).await?,
            Command::Attach(paths) => {
                let requested = paths.len();
                let files: Vec<LocalImageFile> = paths.iter().map(LocalImageFile::new).collect();
                let added = self
                    .wizard
                    .consultation_mut()
                    .attachments_mut()
                    .add_files(files)
                    .await;
                println!(
                    "{}",
                    format!("Attached {added} of {requested} file(s).").bright_black()
                );
            }
            Command::Attachments => {
                let pending = self.wizard.consultation().attachments().pending();
                if pending.is_empty() {
                    println!("{}", "No pending attachments.".bright_black());
                }
                for (i, attachment) in pending.iter().enumerate() {
                    println!(
                        "  {}. {} ({} bytes base64)",
                        i + 1,
                        attachment.mime_type,
                        attachment.data.len()
                    );
                }
            }
            Command::Remove(index) => {
                match self.wizard.consultation_mut().attachments_mut().remove(index) {
                    Some(removed) => println!("Removed {}", removed.mime_type),
                    None => println!("{}", "No attachment at that position.".yellow()),
                }
            }
            Command::Finish(platform) => {
                let outcome = self
                    .wizard
                    .consultation_mut()
                    .finish_and_generate(&platform)
                    .await?;
                if outcome == Outcome::Completed {
                    println!(
                        "{}",
                        "PRD and diagram ready. Try /show prd, /url or /export.".bright_green()
                    );
                }
            }
            Command::Sdd(text) => self.start_sdd(&text, None).await?,
            Command::SddFile(path) => {
                let input = read_text_file(&path).await?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                self.start_sdd(&input, name.as_deref()).await?;
            }
            Command::Ask(text) => {
                let design = self.wizard.design_mut();
                let outcome = design.chat(&text).await?;
                if let Some(last) = design.history().last() {
                    if outcome == Outcome::Failed {
                        print_message("Architect", last);
                    } else if let Some(sdd) = design.sdd() {
                        println!("{}", sdd.content);
                    }
                }
            }
            Command::Show(target) => self.show(target),
            Command::Html(ArtifactTarget::Sdd) => match self.wizard.sdd_html() {
                Some(html) => println!("{html}"),
                None => println!("{}", "No SDD yet.".bright_black()),
            },
            Command::Html(_) => match self.wizard.prd_html() {
                Some(html) => println!("{html}"),
                None => println!("{}", "No PRD yet.".bright_black()),
            },
            Command::Url => {
                let url = self.wizard.diagram_url();
                if url.is_empty() {
                    println!("{}", "No diagram yet.".bright_black());
                } else {
                    println!("{url}");
                }
            }
            Command::Png => {
                let url = self.wizard.diagram_url();
                if url.is_empty() {
                    println!("{}", "No diagram yet.".bright_black());
                } else {
                    let bytes = self.fetcher.fetch_png(&url).await?;
                    let path = self.exporter.save_png(&bytes).await?;
                    println!("{}", format!("Saved {}", path.display()).bright_green());
                }
            }
            Command::Export => self.export().await?,
            Command::Reset => {
                self.wizard.consultation_mut().reset()?;
                println!("{}", "Consultation cleared.".bright_black());
            }
            Command::ResetSdd => {
                self.wizard.design_mut().reset()?;
                println!("{}", "SDD cleared.".bright_black());
            }
            Command::Help => println!("{HELP_TEXT}"),
            Command::Usage(usage) => println!("{}", format!("Usage: {usage}").yellow()),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {name}, see /help").bright_black())
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn say(&mut self, text: &str) -> blueprint_core::Result<()> {
        let consultation = self.wizard.consultation_mut();
        match consultation.phase() {
            ConsultPhase::Initial => {
                consultation.start(text).await?;
            }
            ConsultPhase::Finished => {
                println!(
                    "{}",
                    "The consultation is finished. Use /reset to start a new one.".bright_black()
                );
                return Ok(());
            }
            _ => {
                consultation.reply(text).await?;
            }
        }
        if let Some(last) = consultation.history().last() {
            print_message("Consultant", last);
        }
        Ok(())
    }

    async fn start_sdd(&mut self, input: &str, source: Option<&str>) -> blueprint_core::Result<()> {
        let design = self.wizard.design_mut();
        if design.phase() == SddPhase::Chatting {
            design.reset()?;
        }
        if design.start(input, source).await? == Outcome::Completed {
            print_artifact(design.sdd(), "No SDD yet.");
            println!(
                "{}",
                "Use /ask to refine the SDD or /export to save it.".bright_green()
            );
        }
        Ok(())
    }

    fn show(&self, target: ArtifactTarget) {
        let artifacts = self.wizard.consultation().artifacts();
        match target {
            ArtifactTarget::Prd => print_artifact(artifacts.map(|a| &a.prd), "No PRD yet."),
            ArtifactTarget::Diagram => {
                print_artifact(artifacts.map(|a| &a.diagram), "No diagram yet.")
            }
            ArtifactTarget::Sdd => print_artifact(self.wizard.design().sdd(), "No SDD yet."),
        }
    }

    async fn export(&self) -> blueprint_core::Result<()> {
        let mut written = Vec::new();
        if let Some(artifacts) = self.wizard.consultation().artifacts() {
            written.push(self.exporter.export(&artifacts.prd).await?);
            written.push(self.exporter.export(&artifacts.diagram).await?);
        }
        if let Some(sdd) = self.wizard.design().sdd() {
            written.push(self.exporter.export(sdd).await?);
        }

        if written.is_empty() {
            println!("{}", "Nothing to export yet.".bright_black());
        }
        for path in written {
            println!("{}", format!("Wrote {}", path.display()).bright_green());
        }
        Ok(())
    }
}
