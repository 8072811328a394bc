//! Device service — use-cases for driving registered devices.

use serde::Serialize;

use homesim_domain::capability::{CapabilitySet, DeviceType};
use homesim_domain::entity::{Entity, StateMap};
use homesim_domain::entity_history::HistoryRecord;
use homesim_domain::error::{HomeSimError, NotFoundError, ValidationError};
use homesim_domain::event::Event;
use homesim_domain::time::Timestamp;

use crate::ports::{BoxedEntity, EventPublisher};

/// Read-only snapshot of a registered device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub capabilities: CapabilitySet,
    pub state: StateMap,
}

impl DeviceSummary {
    fn of(entity: &BoxedEntity) -> Self {
        Self {
            id: entity.id().to_string(),
            name: entity.name().to_string(),
            device_type: entity.device_type(),
            capabilities: entity.capabilities(),
            state: entity.state(),
        }
    }
}

/// Application service owning the registered devices, in registration order.
///
/// Events injected by hand go out through the publisher `P`, the same one
/// notifying decorators use.
pub struct DeviceService<P> {
    devices: Vec<BoxedEntity>,
    publisher: P,
}

impl<P: EventPublisher> DeviceService<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            devices: Vec::new(),
            publisher,
        }
    }

    /// Take ownership of a (possibly decorated) device.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateId`] when a device with the same
    /// id is already registered.
    #[tracing::instrument(skip_all, fields(device = entity.id()))]
    pub fn register(&mut self, entity: BoxedEntity) -> Result<(), HomeSimError> {
        if self.find(entity.id()).is_some() {
            return Err(ValidationError::DuplicateId(entity.id().to_string()).into());
        }
        tracing::info!(name = entity.name(), device_type = %entity.device_type(), "device registered");
        self.devices.push(entity);
        Ok(())
    }

    /// Snapshots of every device, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<DeviceSummary> {
        self.devices.iter().map(DeviceSummary::of).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no device has that id.
    pub fn get(&self, id: &str) -> Result<DeviceSummary, HomeSimError> {
        self.find(id)
            .map(|index| DeviceSummary::of(&self.devices[index]))
            .ok_or_else(|| not_found(id))
    }

    /// Current state of a device, synthetic decorator keys included.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no device has that id.
    pub fn get_state(&self, id: &str) -> Result<StateMap, HomeSimError> {
        self.find(id)
            .map(|index| self.devices[index].state())
            .ok_or_else(|| not_found(id))
    }

    /// Apply `patch` to a device; `Ok(false)` when its rules reject the patch.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no device has that id.
    #[tracing::instrument(skip(self, patch))]
    pub fn update_state(&mut self, id: &str, patch: &StateMap) -> Result<bool, HomeSimError> {
        let index = self.find(id).ok_or_else(|| not_found(id))?;
        let applied = self.devices[index].set_state(patch);
        if applied {
            tracing::debug!(keys = patch.len(), "state updated");
        } else {
            tracing::warn!("state update rejected");
        }
        Ok(applied)
    }

    /// Schedule `patch` on a device; `Ok(false)` when the device has no
    /// timer or `at` is not in the future.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no device has that id.
    #[tracing::instrument(skip(self, patch))]
    pub fn schedule(
        &mut self,
        id: &str,
        at: Timestamp,
        patch: StateMap,
    ) -> Result<bool, HomeSimError> {
        let index = self.find(id).ok_or_else(|| not_found(id))?;
        let scheduled = self.devices[index].schedule_action(at, patch);
        if !scheduled {
            tracing::warn!("schedule refused");
        }
        Ok(scheduled)
    }

    /// Recorded changes of a device; empty when it keeps no history.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::NotFound`] when no device has that id.
    pub fn history(&self, id: &str) -> Result<Vec<HistoryRecord>, HomeSimError> {
        self.find(id)
            .map(|index| self.devices[index].state_history())
            .ok_or_else(|| not_found(id))
    }

    /// Publish a hand-made event, as a simulated sensor or a test alert would.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Listener`] when a listener fails on the event.
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type(), source = event.source()))]
    pub fn inject_event(&self, event: Event) -> Result<(), HomeSimError> {
        self.publisher.publish(event)?;
        Ok(())
    }

    /// Fire every scheduled change that came due, across all devices.
    pub fn fire_due_schedules(&mut self) -> usize {
        self.devices
            .iter_mut()
            .map(|device| device.run_due_actions())
            .sum()
    }

    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.devices.iter().position(|device| device.id() == id)
    }
}

fn not_found(id: &str) -> HomeSimError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}
