//! # Notification and Confirmation Adapters
//!
//! The console reports every outcome through a [`Notifier`] and asks a
//! [`ConfirmGate`] before destructive actions. Both are injected, so the
//! engine itself never renders anything.

use parking_lot::Mutex;
use serde::Serialize;

/// Receives user-facing outcome messages.
pub trait Notifier: Send + Sync {
    /// An operation succeeded.
    fn notify_success(&self, message: &str);

    /// An operation failed.
    fn notify_failure(&self, message: &str);
}

/// Answers yes/no before a destructive action proceeds.
pub trait ConfirmGate: Send + Sync {
    /// Whether the user accepts `prompt`.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Logs notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        tracing::info!(target: "mec_console::notice", "{message}");
    }

    fn notify_failure(&self, message: &str) {
        tracing::warn!(target: "mec_console::notice", "{message}");
    }
}

/// Severity of a recorded notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Success notification.
    Success,
    /// Failure notification.
    Failure,
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Messages of one level.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.notices.lock().clear();
    }

    fn push(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push(Notice {
            level,
            message: message.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.push(NoticeLevel::Success, message);
    }

    fn notify_failure(&self, message: &str) {
        self.push(NoticeLevel::Failure, message);
    }
}

/// Gives the same answer to every prompt and remembers what was asked.
#[derive(Debug, Default)]
pub struct StaticConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl StaticConfirm {
    /// Accept every prompt.
    pub fn accept() -> Self {
        Self::answering(true)
    }

    /// Decline every prompt.
    pub fn decline() -> Self {
        Self::answering(false)
    }

    /// Answer every prompt with `answer`.
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl ConfirmGate for StaticConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify_success("Client added successfully");
        notifier.notify_failure("Failed to delete image");
        assert_eq!(
            notifier.notices(),
            vec![
                Notice {
                    level: NoticeLevel::Success,
                    message: "Client added successfully".into()
                },
                Notice {
                    level: NoticeLevel::Failure,
                    message: "Failed to delete image".into()
                },
            ]
        );
        assert_eq!(notifier.messages(NoticeLevel::Failure), vec!["Failed to delete image"]);
    }

    #[test]
    fn static_confirm_records_prompts() {
        let gate = StaticConfirm::decline();
        assert!(!gate.confirm("Are you sure?"));
        assert_eq!(gate.prompts(), vec!["Are you sure?"]);
    }
}
