//! # Terminal Adapters
//!
//! Notification and confirmation adapters for an interactive terminal.

use std::io::{BufRead, Write};

use mec_console::{ConfirmGate, Notifier};

/// Prints notifications: successes to stdout, failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        tracing::debug!(message, "success notice");
        println!("{message}");
    }

    fn notify_failure(&self, message: &str) {
        tracing::debug!(message, "failure notice");
        eprintln!("error: {message}");
    }
}

/// Asks on stderr and reads the answer from stdin. Anything other than an
/// explicit yes declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirm;

impl ConfirmGate for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        if std::io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

/// Whether a typed answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
