//! Surface Collaborators
//!
//! Capabilities the engine needs from whatever UI surface hosts it: a way to
//! show notifications and a way to ask the user for confirmation. The
//! engine never renders anything itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Notification level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// An operation completed
    Success,
    /// Something was refused locally
    Warning,
    /// A remote operation failed
    Error,
}

/// A message for the user outside the conversation transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
}

impl Notification {
    /// Create a notification
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Where notifications go
pub trait Notifier: Send + Sync {
    /// Deliver a notification; must not block
    fn notify(&self, notification: Notification);
}

/// Surfaces that consume notifications from a channel
impl Notifier for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.send(notification) {
            tracing::warn!(message = %e.0.message, "Notification dropped: receiver closed");
        }
    }
}

/// Notifier that only logs
///
/// Useful for headless operation and as a default.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Info | NotifyLevel::Success => {
                tracing::info!(level = ?notification.level, "{}", notification.message);
            }
            NotifyLevel::Warning | NotifyLevel::Error => {
                tracing::warn!(level = ?notification.level, "{}", notification.message);
            }
        }
    }
}

/// Asks the user to confirm a destructive action
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Show `prompt` and resolve to the user's answer
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Prompt with a fixed answer
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmPrompt for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "Auto-answered confirmation");
        self.0
    }
}
