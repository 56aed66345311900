//! Notification surface used by the board.

use std::time::Duration;

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A button attached to a notification, available for a bounded time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub label: String,
    pub expires_after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub message: String,
    pub severity: Severity,
    pub action: Option<NotificationAction>,
}

impl NotificationRequest {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
            action: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            action: None,
        }
    }

    pub fn with_action(mut self, label: impl Into<String>, expires_after: Duration) -> Self {
        self.action = Some(NotificationAction {
            label: label.into(),
            expires_after,
        });
        self
    }
}

/// Where the board reports outcomes.
pub trait Notifier {
    fn show(&mut self, request: NotificationRequest) -> NotificationId;
    fn dismiss(&mut self, id: NotificationId);
}

/// Notifier that records everything; suits headless clients and tests.
#[derive(Debug, Default)]
pub struct NotificationLog {
    next_id: NotificationId,
    pub shown: Vec<(NotificationId, NotificationRequest)>,
    pub dismissed: Vec<NotificationId>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&NotificationRequest> {
        self.shown.last().map(|(_, n)| n)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter(|(_, n)| n.severity == Severity::Error)
            .map(|(_, n)| n.message.as_str())
            .collect()
    }

    pub fn successes(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter(|(_, n)| n.severity == Severity::Success)
            .map(|(_, n)| n.message.as_str())
            .collect()
    }
}

impl Notifier for NotificationLog {
    fn show(&mut self, request: NotificationRequest) -> NotificationId {
        self.next_id += 1;
        match request.severity {
            Severity::Success => tracing::info!(id = self.next_id, "{}", request.message),
            Severity::Error => tracing::warn!(id = self.next_id, "{}", request.message),
        }
        self.shown.push((self.next_id, request));
        self.next_id
    }

    fn dismiss(&mut self, id: NotificationId) {
        self.dismissed.push(id);
    }
}
