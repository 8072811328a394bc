//! Notification service — turns selected events into human-readable messages.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;

use homesim_domain::error::ListenerError;
use homesim_domain::event::{Event, EventType};

use crate::ports::{EventListener, NotificationSink};

/// Event types a [`NotificationService`] listens to unless told otherwise.
pub const DEFAULT_NOTIFICATION_TYPES: [EventType; 3] = [
    EventType::MotionDetected,
    EventType::DoorOpened,
    EventType::SystemAlert,
];

/// A message that was sent (or would have been sent) to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub timestamp: String,
    pub message: String,
    pub event_type: EventType,
    pub source: String,
}

/// Format the user-facing message for `event`.
#[must_use]
pub fn format_message(event: &Event) -> String {
    match event.event_type() {
        EventType::MotionDetected => format!("Motion detected by {}!", event.source()),
        EventType::DoorOpened => format!("Door opened: {}", event.source()),
        EventType::SystemAlert => {
            let severity = event.data_str("severity").unwrap_or("unknown");
            let message = event.data_str("message").unwrap_or("System alert");
            format!("{} ALERT: {message}", severity.to_uppercase())
        }
        EventType::DeviceStateChanged => {
            let device = event
                .data_str("device_name")
                .unwrap_or_else(|| event.source());
            format!("Device state changed: {device}")
        }
        other => format!("Event occurred: {other} from {}", event.source()),
    }
}

/// Sink that writes notifications to the `tracing` pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, notification: &Notification) -> Result<(), ListenerError> {
        tracing::info!(
            target: "homesim::notification",
            event_type = %notification.event_type,
            source = %notification.source,
            "{}",
            notification.message
        );
        Ok(())
    }
}

/// Sink that fans notifications out over a tokio broadcast channel.
///
/// Emitting succeeds even when nobody is listening.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive notifications emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn emit(&self, notification: &Notification) -> Result<(), ListenerError> {
        // send only fails without receivers, which is fine here.
        let _ = self.sender.send(notification.clone());
        Ok(())
    }
}

/// Listener that formats a message per event, keeps an unbounded history of
/// what it sent and hands each message to a [`NotificationSink`].
pub struct NotificationService<S = TracingSink> {
    event_types: Mutex<BTreeSet<EventType>>,
    history: Mutex<Vec<Notification>>,
    sink: S,
}

impl NotificationService<TracingSink> {
    /// A service on the default critical event types, logging through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }
}

impl Default for NotificationService<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: NotificationSink> NotificationService<S> {
    #[must_use]
    pub fn with_sink(sink: S) -> Self {
        Self {
            event_types: Mutex::new(DEFAULT_NOTIFICATION_TYPES.into_iter().collect()),
            history: Mutex::new(Vec::new()),
            sink,
        }
    }

    #[must_use]
    pub fn with_event_types(self, event_types: impl IntoIterator<Item = EventType>) -> Self {
        self.set_event_types(event_types);
        self
    }

    /// Change the declared interests.
    ///
    /// The router only sees the change once the service is resubscribed.
    pub fn set_event_types(&self, event_types: impl IntoIterator<Item = EventType>) {
        *self
            .event_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = event_types.into_iter().collect();
    }

    /// A copy of every notification sent so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Notification> {
        self.lock_history().clone()
    }

    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: NotificationSink> EventListener for NotificationService<S> {
    fn name(&self) -> &str {
        "notification_service"
    }

    fn update(&self, event: &Event) -> Result<(), ListenerError> {
        let notification = Notification {
            timestamp: event.timestamp().to_rfc3339(),
            message: format_message(event),
            event_type: event.event_type(),
            source: event.source().to_string(),
        };
        self.lock_history().push(notification.clone());
        self.sink.emit(&notification)
    }

    fn subscribed_event_types(&self) -> BTreeSet<EventType> {
        self.event_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
