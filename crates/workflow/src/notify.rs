//! Fire-and-forget user notifications and navigation requests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast-style notification target.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Route change target, used on login and forced logout.
pub trait NavigationSink: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Sink that only logs. Useful for headless embedding.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        debug!(kind = ?kind, message, "Notification");
    }
}

/// Notification sink that keeps every notice, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().clone()
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices.lock().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().push((kind, message.to_string()));
    }
}

/// Navigation sink that keeps every redirect target, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.redirects.lock().last().cloned()
    }
}

impl NavigationSink for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
    }
}
