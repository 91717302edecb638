//! User-visible, must-acknowledge notifications.

/// Surfaces a failure the user has to acknowledge (a modal alert in a GUI,
/// a highlighted line in a terminal).
pub trait UserNotifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier that only writes to the log. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("[Alert] {}", message);
    }
}
