//! User-facing notifications (the toasts of a graphical front end).

use std::sync::Mutex;

/// Receives the outcome messages of mutations
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Emits notifications as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::warn!(notification = "error", "{}", message);
    }
}

/// A notification as seen by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Keeps every notification in order; for embedding and tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Success(msg) => Some(msg),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(msg) => Some(msg),
                Notification::Success(_) => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("saved");
        notifier.error("boom");
        notifier.success("again");

        assert_eq!(
            notifier.notifications(),
            vec![
                Notification::Success("saved".to_string()),
                Notification::Error("boom".to_string()),
                Notification::Success("again".to_string()),
            ]
        );
        assert_eq!(notifier.successes(), vec!["saved", "again"]);
        assert_eq!(notifier.errors(), vec!["boom"]);
    }

    #[test]
    fn tracing_notifier_is_object_safe() {
        let notifiers: Vec<Box<dyn Notifier>> =
            vec![Box::new(TracingNotifier), Box::new(RecordingNotifier::new())];
        for notifier in &notifiers {
            notifier.success("Pattern created successfully.");
            notifier.error("Something went wrong.");
        }
    }
}
