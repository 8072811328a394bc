//! Listener port — the consume side of publish/subscribe.

use std::collections::BTreeSet;

use homesim_domain::error::ListenerError;
use homesim_domain::event::{Event, EventType};

/// A consumer registered against a set of event types.
///
/// Listeners are shared behind `Arc` by the router, so `update` takes
/// `&self`; implementations keep their own records behind a lock.
pub trait EventListener: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// A failure is propagated out of the router's dispatch unchanged.
    fn update(&self, event: &Event) -> Result<(), ListenerError>;

    /// The event types this listener wants.
    ///
    /// Read once when subscribing; later changes only take effect after the
    /// listener is subscribed again.
    fn subscribed_event_types(&self) -> BTreeSet<EventType>;
}
