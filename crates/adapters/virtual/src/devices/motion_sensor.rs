//! Motion sensor — battery powered, adjustable sensitivity.

use homesim_domain::capability::{Capability, DeviceType};
use homesim_domain::entity::Device;
use homesim_domain::error::HomeSimError;

/// Build an idle motion sensor at medium sensitivity (on a 1 to 10 scale).
///
/// # Errors
///
/// Returns a validation error when `id` or `name` is empty.
pub fn motion_sensor(id: &str, name: &str) -> Result<Device, HomeSimError> {
    Device::builder()
        .id(id)
        .name(name)
        .device_type(DeviceType::Sensor)
        .capability(Capability::Power)
        .capability(Capability::Motion)
        .state("motion_detected", false)
        .state("sensitivity", 5)
        .state("battery_level", 100)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::entity::{Entity, StateValue, state_map};

    #[test]
    fn should_start_idle() {
        let sensor = motion_sensor("sensor-1", "Hallway").unwrap();
        let state = sensor.state();
        assert_eq!(state["motion_detected"], StateValue::Bool(false));
        assert_eq!(state["sensitivity"], StateValue::Int(5));
        assert_eq!(sensor.device_type(), DeviceType::Sensor);
    }

    #[test]
    fn should_flag_motion() {
        let mut sensor = motion_sensor("sensor-1", "Hallway").unwrap();
        assert!(sensor.set_state(&state_map([("motion_detected", true.into())])));
        assert_eq!(sensor.state()["motion_detected"], StateValue::Bool(true));
    }
}
