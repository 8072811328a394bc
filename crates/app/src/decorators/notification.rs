//! Notification decorator: publishes a state-changed event after updates.

use homesim_domain::capability::{Capability, CapabilitySet, DeviceType};
use homesim_domain::entity::{Entity, StateMap, StateValue, state_to_json};
use homesim_domain::entity_history::HistoryRecord;
use homesim_domain::event::{Event, EventType};
use homesim_domain::time::Timestamp;

use crate::ports::EventPublisher;

/// Synthetic state key: always `true` on a notifying entity.
pub const NOTIFICATIONS_ENABLED_KEY: &str = "notifications_enabled";

/// Decides whether a successful update deserves an event.
///
/// Called with the state before and after the update.
pub trait NotifyCriteria: Send + Sync {
    fn should_notify(&self, old_state: &StateMap, new_state: &StateMap) -> bool;
}

impl<F> NotifyCriteria for F
where
    F: Fn(&StateMap, &StateMap) -> bool + Send + Sync,
{
    fn should_notify(&self, old_state: &StateMap, new_state: &StateMap) -> bool {
        self(old_state, new_state)
    }
}

/// Notify after every successful update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl NotifyCriteria for Always {
    fn should_notify(&self, _old_state: &StateMap, _new_state: &StateMap) -> bool {
        true
    }
}

/// Notify only when the observable state differs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnChange;

impl NotifyCriteria for OnChange {
    fn should_notify(&self, old_state: &StateMap, new_state: &StateMap) -> bool {
        old_state != new_state
    }
}

/// Wraps an entity and publishes [`EventType::DeviceStateChanged`] through
/// `P` after each successful update accepted by the criteria.
///
/// # Listener failures
///
/// Publishing happens after the inner entity accepted the patch. When a
/// listener fails, the error is logged with `tracing::warn!` and dropped:
/// `set_state` still returns `true`, so `true` means the state changed, not
/// that every listener handled the event. Callers needing delivery errors
/// publish through [`EventRouter::notify`](crate::event_bus::EventRouter::notify)
/// themselves.
pub struct NotificationDecorator<E, P> {
    inner: E,
    publisher: P,
    criteria: Box<dyn NotifyCriteria>,
}

impl<E: Entity, P: EventPublisher> NotificationDecorator<E, P> {
    /// Notify on every successful update.
    #[must_use]
    pub fn new(inner: E, publisher: P) -> Self {
        Self::with_criteria(inner, publisher, Always)
    }

    #[must_use]
    pub fn with_criteria(inner: E, publisher: P, criteria: impl NotifyCriteria + 'static) -> Self {
        Self {
            inner,
            publisher,
            criteria: Box::new(criteria),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn state_changed_event(&self, old_state: &StateMap, new_state: &StateMap) -> Event {
        Event::builder(EventType::DeviceStateChanged, self.inner.id())
            .field("device_name", self.inner.name())
            .field("device_type", self.inner.device_type().as_str())
            .field("old_state", state_to_json(old_state))
            .field("new_state", state_to_json(new_state))
            .build()
    }
}

impl<E: Entity, P: EventPublisher> Entity for NotificationDecorator<E, P> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn device_type(&self) -> DeviceType {
        self.inner.device_type()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.inner.capabilities()
    }

    fn state(&self) -> StateMap {
        let mut state = self.inner.state();
        state.insert(
            NOTIFICATIONS_ENABLED_KEY.to_string(),
            StateValue::Bool(true),
        );
        state
    }

    fn set_state(&mut self, patch: &StateMap) -> bool {
        let old_state = self.inner.state();
        if !self.inner.set_state(patch) {
            return false;
        }
        let new_state = self.inner.state();
        if self.criteria.should_notify(&old_state, &new_state) {
            let event = self.state_changed_event(&old_state, &new_state);
            if let Err(err) = self.publisher.publish(event) {
                tracing::warn!(
                    device = self.inner.id(),
                    error = %err,
                    "failed to publish state change"
                );
            }
        }
        true
    }

    fn supports_capability(&self, capability: Capability) -> bool {
        self.inner.supports_capability(capability)
    }

    fn run_due_actions(&mut self) -> usize {
        self.inner.run_due_actions()
    }

    fn schedule_action(&mut self, at: Timestamp, patch: StateMap) -> bool {
        self.inner.schedule_action(at, patch)
    }

    fn state_history(&self) -> Vec<HistoryRecord> {
        self.inner.state_history()
    }
}
