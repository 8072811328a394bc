//! Thermostat — target temperature bounded by the configured range.

use homesim_domain::capability::{Capability, DeviceType};
use homesim_domain::entity::{Device, StateRule};
use homesim_domain::error::HomeSimError;

/// The key the temperature range applies to.
pub const TARGET_TEMPERATURE: &str = "target_temperature";

/// Options of a simulated thermostat, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermostat {
    pub min_temp: f64,
    pub max_temp: f64,
}

impl Default for Thermostat {
    fn default() -> Self {
        Self {
            min_temp: 10.0,
            max_temp: 32.0,
        }
    }
}

impl Thermostat {
    /// Build the device, off, at room temperature.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `id` or `name` is empty, or when
    /// `min_temp` is above `max_temp`.
    pub fn build(self, id: &str, name: &str) -> Result<Device, HomeSimError> {
        Device::builder()
            .id(id)
            .name(name)
            .device_type(DeviceType::Thermostat)
            .capability(Capability::Power)
            .capability(Capability::Temperature)
            .state("current_temperature", 21.0)
            .state(TARGET_TEMPERATURE, 21.0)
            .state("mode", "off")
            .state("humidity", 50.0)
            .rule(StateRule::range(TARGET_TEMPERATURE, self.min_temp, self.max_temp))
            .build()
    }
}
