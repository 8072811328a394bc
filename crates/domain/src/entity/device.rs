//! The base device: identity, fixed capabilities, a seeded state bag and the
//! validation rules guarding it.

use serde::{Deserialize, Serialize};

use super::{Entity, StateMap, StateValue};
use crate::capability::{Capability, CapabilitySet, DeviceType};
use crate::error::{HomeSimError, ValidationError};

/// A validation rule checked against every incoming patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateRule {
    /// When the patch carries `key`, its value must be numeric and lie in
    /// `[min, max]` (both inclusive).
    Range { key: String, min: f64, max: f64 },
}

impl StateRule {
    #[must_use]
    pub fn range(key: impl Into<String>, min: f64, max: f64) -> Self {
        Self::Range {
            key: key.into(),
            min,
            max,
        }
    }

    /// Whether `patch` satisfies this rule.
    #[must_use]
    pub fn accepts(&self, patch: &StateMap) -> bool {
        match self {
            Self::Range { key, min, max } => match patch.get(key) {
                None => true,
                Some(value) => value
                    .as_f64()
                    .is_some_and(|number| *min <= number && number <= *max),
            },
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Range { key, min, max } if min > max => Err(ValidationError::InvalidRange {
                key: key.clone(),
                min: *min,
                max: *max,
            }),
            Self::Range { .. } => Ok(()),
        }
    }
}

/// A concrete device holding its own state.
///
/// The key set of `state` is fixed by the builder; [`Entity::set_state`]
/// never adds a key.
#[derive(Debug, Clone)]
pub struct Device {
    id: String,
    name: String,
    device_type: DeviceType,
    capabilities: CapabilitySet,
    state: StateMap,
    rules: Vec<StateRule>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// The validation rules applied on every update.
    #[must_use]
    pub fn rules(&self) -> &[StateRule] {
        &self.rules
    }
}

impl Entity for Device {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    fn state(&self) -> StateMap {
        self.state.clone()
    }

    fn set_state(&mut self, patch: &StateMap) -> bool {
        if !self.rules.iter().all(|rule| rule.accepts(patch)) {
            return false;
        }
        for (key, value) in patch {
            if let Some(slot) = self.state.get_mut(key) {
                *slot = value.clone();
            }
        }
        true
    }
}

/// Step-by-step builder for [`Device`].
///
/// Every device starts with a `power` key set to `false`.
#[derive(Debug)]
pub struct DeviceBuilder {
    id: Option<String>,
    name: Option<String>,
    device_type: DeviceType,
    capabilities: CapabilitySet,
    state: StateMap,
    rules: Vec<StateRule>,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        let mut state = StateMap::new();
        state.insert("power".to_string(), StateValue::Bool(false));
        Self {
            id: None,
            name: None,
            device_type: DeviceType::Sensor,
            capabilities: CapabilitySet::new(),
            state,
            rules: Vec::new(),
        }
    }
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }

    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Seed a state key with its default value.
    #[must_use]
    pub fn state(mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: StateRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when the id or name is empty, or
    /// when a range rule has `min > max`.
    pub fn build(self) -> Result<Device, HomeSimError> {
        let id = self.id.unwrap_or_default();
        if id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        let name = self.name.unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(Device {
            id,
            name,
            device_type: self.device_type,
            capabilities: self.capabilities,
            state: self.state,
            rules: self.rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::state_map;

    fn thermostat() -> Device {
        Device::builder()
            .id("therm-1")
            .name("Bedroom Thermostat")
            .device_type(DeviceType::Thermostat)
            .capability(Capability::Power)
            .capability(Capability::Temperature)
            .state("target_temperature", 21.0)
            .state("mode", "off")
            .rule(StateRule::range("target_temperature", 10.0, 32.0))
            .build()
            .unwrap()
    }

    #[test]
    fn should_seed_power_off_by_default() {
        let device = thermostat();
        assert_eq!(device.state()["power"], StateValue::Bool(false));
    }

    #[test]
    fn should_overwrite_existing_keys() {
        let mut device = thermostat();
        assert!(device.set_state(&state_map([("mode", "heat".into())])));
        assert_eq!(device.state()["mode"], StateValue::from("heat"));
    }

    #[test]
    fn should_ignore_unknown_keys_and_report_success() {
        let mut device = thermostat();
        let before = device.state();

        assert!(device.set_state(&state_map([("turbo", true.into())])));
        assert_eq!(device.state(), before);
    }

    #[test]
    fn should_reject_out_of_range_values_without_partial_application() {
        let mut device = thermostat();
        let before = device.state();

        let patch = state_map([("target_temperature", 9.0.into()), ("mode", "heat".into())]);
        assert!(!device.set_state(&patch));
        assert_eq!(device.state(), before);

        let patch = state_map([("target_temperature", 33.into())]);
        assert!(!device.set_state(&patch));
        assert_eq!(device.state(), before);
    }

    #[test]
    fn should_accept_inclusive_bounds() {
        let mut device = thermostat();
        assert!(device.set_state(&state_map([("target_temperature", 10.0.into())])));
        assert!(device.set_state(&state_map([("target_temperature", 32.into())])));
        assert_eq!(device.state()["target_temperature"], StateValue::Int(32));
    }

    #[test]
    fn should_reject_non_numeric_value_for_ranged_key() {
        let mut device = thermostat();
        assert!(!device.set_state(&state_map([("target_temperature", "warm".into())])));
    }

    #[test]
    fn should_not_leak_mutations_through_returned_state() {
        let device = thermostat();
        let mut copy = device.state();
        copy.insert("mode".to_string(), "cool".into());
        assert_eq!(device.state()["mode"], StateValue::from("off"));
    }

    #[test]
    fn should_check_capability_membership() {
        let device = thermostat();
        assert!(device.supports_capability(Capability::Temperature));
        assert!(!device.supports_capability(Capability::Video));
    }

    #[test]
    fn should_reject_empty_id() {
        let result = Device::builder().name("x").build();
        assert!(matches!(
            result,
            Err(HomeSimError::Validation(ValidationError::EmptyId))
        ));
    }

    #[test]
    fn should_reject_empty_name() {
        let result = Device::builder().id("x").build();
        assert!(matches!(
            result,
            Err(HomeSimError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_inverted_range() {
        let result = Device::builder()
            .id("x")
            .name("x")
            .rule(StateRule::range("t", 30.0, 10.0))
            .build();
        assert!(matches!(
            result,
            Err(HomeSimError::Validation(ValidationError::InvalidRange { .. }))
        ));
    }
}
