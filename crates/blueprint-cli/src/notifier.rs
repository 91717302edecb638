use std::io::{BufRead, Write};

use colored::Colorize;

use blueprint_core::notifier::UserNotifier;

/// Prints the alert and waits for the user to press Enter.
pub struct TerminalNotifier;

impl UserNotifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{} {}", "!".bright_red().bold(), message.bright_red());
        eprint!("{}", "Press Enter to continue...".bright_black());
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }
}
