//! Concrete listeners — consumers plugged into the [`EventRouter`](crate::event_bus::EventRouter).

pub mod event_log;
pub mod notification;

pub use event_log::{DEFAULT_MAX_LOG_SIZE, EventLog, LogRecord};
pub use notification::{
    BroadcastSink, DEFAULT_NOTIFICATION_TYPES, Notification, NotificationService, TracingSink,
    format_message,
};
