//! Entity — a named, identified thing with a fixed capability set and a
//! mutable bag of named properties.
//!
//! [`Entity`] is the seam every decorator plugs into: a decorator owns an
//! inner entity and is itself an entity, so behaviours stack by nesting.

mod device;
mod state;

pub use device::{Device, DeviceBuilder, StateRule};
pub use state::{StateMap, StateValue, state_map, state_to_json};

use crate::capability::{Capability, CapabilitySet, DeviceType};
use crate::entity_history::HistoryRecord;
use crate::time::Timestamp;

/// The state contract shared by devices and the decorators wrapping them.
///
/// # Closed state
///
/// `set_state` only overwrites keys that already exist. Unknown keys are
/// dropped without error; a validation failure rejects the whole patch and
/// leaves the state untouched.
pub trait Entity {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn device_type(&self) -> DeviceType;

    fn capabilities(&self) -> CapabilitySet;

    /// A copy of the current state; mutating it never affects the entity.
    fn state(&self) -> StateMap;

    /// Apply `patch`, returning `false` when a validation rule rejects it.
    fn set_state(&mut self, patch: &StateMap) -> bool;

    fn supports_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Apply every scheduled change that has come due, returning how many
    /// fired. Plain devices hold no schedules; decorators forward the call
    /// so a timer anywhere in the stack is reached.
    fn run_due_actions(&mut self) -> usize {
        0
    }

    /// Store `patch` to be applied at `at`. `false` when nothing in the
    /// stack can hold schedules or `at` is not in the future.
    fn schedule_action(&mut self, _at: Timestamp, _patch: StateMap) -> bool {
        false
    }

    /// Recorded changes of the nearest history-keeping layer, oldest first.
    fn state_history(&self) -> Vec<HistoryRecord> {
        Vec::new()
    }
}

impl<E: Entity + ?Sized> Entity for Box<E> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn device_type(&self) -> DeviceType {
        (**self).device_type()
    }

    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }

    fn state(&self) -> StateMap {
        (**self).state()
    }

    fn set_state(&mut self, patch: &StateMap) -> bool {
        (**self).set_state(patch)
    }

    fn supports_capability(&self, capability: Capability) -> bool {
        (**self).supports_capability(capability)
    }

    fn run_due_actions(&mut self) -> usize {
        (**self).run_due_actions()
    }

    fn schedule_action(&mut self, at: Timestamp, patch: StateMap) -> bool {
        (**self).schedule_action(at, patch)
    }

    fn state_history(&self) -> Vec<HistoryRecord> {
        (**self).state_history()
    }
}
