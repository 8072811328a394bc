//! Smart lock — locked by default, battery powered.

use homesim_domain::capability::{Capability, DeviceType};
use homesim_domain::entity::{Device, StateValue};
use homesim_domain::error::HomeSimError;

/// Build a locked smart lock with a full battery and no last user.
///
/// # Errors
///
/// Returns a validation error when `id` or `name` is empty.
pub fn smart_lock(id: &str, name: &str) -> Result<Device, HomeSimError> {
    Device::builder()
        .id(id)
        .name(name)
        .device_type(DeviceType::Lock)
        .capability(Capability::LockUnlock)
        .state("locked", true)
        .state("battery_level", 100)
        .state("last_user", StateValue::Null)
        .build()
}
