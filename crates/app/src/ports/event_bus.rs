//! Event bus port — the publish side of publish/subscribe.

use std::sync::Arc;

use homesim_domain::error::ListenerError;
use homesim_domain::event::Event;

/// Publishes events to interested listeners.
///
/// Delivery is synchronous: `publish` returns once every interested listener
/// has handled the event, or with the first listener failure.
pub trait EventPublisher {
    /// Publish an event to all current subscribers of its type.
    ///
    /// # Errors
    ///
    /// Returns the [`ListenerError`] of the first listener that failed.
    fn publish(&self, event: Event) -> Result<(), ListenerError>;
}

impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    fn publish(&self, event: Event) -> Result<(), ListenerError> {
        (**self).publish(event)
    }
}

impl<T: EventPublisher + ?Sized> EventPublisher for &T {
    fn publish(&self, event: Event) -> Result<(), ListenerError> {
        (**self).publish(event)
    }
}
