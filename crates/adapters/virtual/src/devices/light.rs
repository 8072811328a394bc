//! Smart light — power, optional dimming and colour.

use homesim_domain::capability::{Capability, DeviceType};
use homesim_domain::entity::Device;
use homesim_domain::error::HomeSimError;

/// Brightness of a freshly installed dimmable light, in percent.
pub const DEFAULT_BRIGHTNESS: i64 = 100;
/// Colour of a freshly installed colour light.
pub const DEFAULT_COLOR: &str = "#FFFFFF";
/// Warm white, in Kelvin.
pub const DEFAULT_COLOR_TEMPERATURE: i64 = 2700;

/// Options of a simulated light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartLight {
    pub dimmable: bool,
    pub color_adjustable: bool,
}

impl Default for SmartLight {
    fn default() -> Self {
        Self {
            dimmable: true,
            color_adjustable: false,
        }
    }
}

impl SmartLight {
    /// Build the device, switched off.
    ///
    /// A light that is not dimmable still carries a `brightness` key, set to
    /// null.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `id` or `name` is empty.
    pub fn build(self, id: &str, name: &str) -> Result<Device, HomeSimError> {
        let mut builder = Device::builder()
            .id(id)
            .name(name)
            .device_type(DeviceType::Light)
            .capability(Capability::Power)
            .state("brightness", self.dimmable.then_some(DEFAULT_BRIGHTNESS));

        if self.dimmable {
            builder = builder.capability(Capability::Brightness);
        }
        if self.color_adjustable {
            builder = builder
                .capability(Capability::Color)
                .state("color", DEFAULT_COLOR)
                .state("color_temperature", DEFAULT_COLOR_TEMPERATURE);
        }
        builder.build()
    }
}
