//! Timer decorator — stores future state changes for an entity.

use std::sync::Arc;

use serde::Serialize;

use homesim_domain::capability::{Capability, CapabilitySet, DeviceType};
use homesim_domain::entity::{Entity, StateMap, StateValue, state_to_json};
use homesim_domain::entity_history::HistoryRecord;
use homesim_domain::id::ScheduleId;
use homesim_domain::time::{Clock, SystemClock, Timestamp};

/// Synthetic state key: whether any schedule is stored.
pub const HAS_SCHEDULES_KEY: &str = "has_schedules";
/// Synthetic state key: the nearest pending schedule, or null.
pub const NEXT_SCHEDULED_ACTION_KEY: &str = "next_scheduled_action";

/// A state patch to apply at a given time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAction {
    pub id: ScheduleId,
    pub trigger_at: Timestamp,
    pub patch: StateMap,
}

impl ScheduledAction {
    fn to_state_value(&self) -> StateValue {
        StateValue::Json(serde_json::json!({
            "time": self.trigger_at.to_rfc3339(),
            "state_changes": state_to_json(&self.patch),
        }))
    }
}

/// Wraps an entity with a list of scheduled state changes.
///
/// Schedules are only stored here; something external (see
/// [`ScheduleRunner`](crate::scheduler::ScheduleRunner)) calls
/// [`Entity::run_due_actions`] to apply the ones that came due.
pub struct TimerDecorator<E> {
    inner: E,
    schedules: Vec<ScheduledAction>,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> TimerDecorator<E> {
    #[must_use]
    pub fn new(inner: E) -> Self {
        Self::with_clock(inner, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(inner: E, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            schedules: Vec::new(),
            clock,
        }
    }

    /// Store `patch` to be applied at `at`.
    ///
    /// Returns the schedule id, or `None` when `at` is not strictly in the future.
    pub fn schedule(&mut self, at: Timestamp, patch: StateMap) -> Option<ScheduleId> {
        if at <= self.clock.now() {
            tracing::debug!(device = self.inner.id(), %at, "refusing schedule in the past");
            return None;
        }
        let id = ScheduleId::new();
        self.schedules.push(ScheduledAction {
            id,
            trigger_at: at,
            patch,
        });
        Some(id)
    }

    /// Store `patch` to be applied `delay` from now.
    ///
    /// `false` when `delay` is not positive or reaches past the representable
    /// time range.
    pub fn schedule_action_in(&mut self, delay: chrono::Duration, patch: StateMap) -> bool {
        let Some(at) = self.clock.now().checked_add_signed(delay) else {
            tracing::debug!(device = self.inner.id(), %delay, "refusing out-of-range schedule");
            return false;
        };
        self.schedule(at, patch).is_some()
    }

    /// Drop one schedule; `false` when no schedule has that id.
    pub fn cancel_schedule(&mut self, id: ScheduleId) -> bool {
        let before = self.schedules.len();
        self.schedules.retain(|action| action.id != id);
        self.schedules.len() != before
    }

    pub fn cancel_all_schedules(&mut self) {
        self.schedules.clear();
    }

    /// A copy of every stored schedule, in insertion order.
    #[must_use]
    pub fn scheduled_actions(&self) -> Vec<ScheduledAction> {
        self.schedules.clone()
    }

    /// The pending schedule with the earliest trigger time still in the future.
    #[must_use]
    pub fn next_scheduled_action(&self) -> Option<&ScheduledAction> {
        let now = self.clock.now();
        self.schedules
            .iter()
            .filter(|action| action.trigger_at > now)
            .min_by_key(|action| action.trigger_at)
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Apply and remove the schedules of this decorator that came due, in
    /// trigger order, returning how many fired.
    ///
    /// Patches go to the inner entity; a rejected patch is logged and dropped.
    pub fn fire_due(&mut self) -> usize {
        let now = self.clock.now();
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .schedules
            .drain(..)
            .partition(|action| action.trigger_at <= now);
        self.schedules = pending;
        due.sort_by_key(|action| action.trigger_at);

        for action in &due {
            if !self.inner.set_state(&action.patch) {
                tracing::warn!(
                    device = self.inner.id(),
                    schedule = %action.id,
                    "scheduled state change rejected"
                );
            }
        }
        due.len()
    }
}

impl<E: Entity> Entity for TimerDecorator<E> {
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
            HAS_SCHEDULES_KEY.to_string(),
            StateValue::Bool(!self.schedules.is_empty()),
        );
        state.insert(
            NEXT_SCHEDULED_ACTION_KEY.to_string(),
            self.next_scheduled_action()
                .map_or(StateValue::Null, ScheduledAction::to_state_value),
        );
        state
    }

    fn set_state(&mut self, patch: &StateMap) -> bool {
        self.inner.set_state(patch)
    }

    fn supports_capability(&self, capability: Capability) -> bool {
        self.inner.supports_capability(capability)
    }

    fn run_due_actions(&mut self) -> usize {
        self.inner.run_due_actions() + self.fire_due()
    }

    fn schedule_action(&mut self, at: Timestamp, patch: StateMap) -> bool {
        self.schedule(at, patch).is_some()
    }

    fn state_history(&self) -> Vec<HistoryRecord> {
        self.inner.state_history()
    }
}
