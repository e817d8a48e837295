//! Discovery notifications.
//!
//! Notifications are best effort: callers log failures and carry on.

mod telegram;

pub use telegram::{TelegramNotifier, DEFAULT_TELEGRAM_API};

/// Errors from sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification rejected with HTTP status {0}")]
    Status(u16),
}

/// A sink for human-readable messages.
pub trait Notifier: Send + Sync {
    /// Sends `text` (Markdown formatted).
    fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
