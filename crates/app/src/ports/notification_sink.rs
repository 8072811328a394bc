//! Notification sink port — where formatted notifications leave the system.

use homesim_domain::error::ListenerError;

use crate::listeners::Notification;

/// Delivers a user-facing notification (SMS, e-mail, a log line, …).
pub trait NotificationSink: Send + Sync {
    /// Emit one notification.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when delivery fails; the notification
    /// service surfaces it as its own failure.
    fn emit(&self, notification: &Notification) -> Result<(), ListenerError>;
}
