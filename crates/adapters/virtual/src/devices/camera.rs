//! Security camera — video, optionally motion detection and audio.

use homesim_domain::capability::{Capability, DeviceType};
use homesim_domain::entity::Device;
use homesim_domain::error::HomeSimError;

/// Options of a simulated camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    pub has_motion_detection: bool,
    pub has_audio: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            has_motion_detection: true,
            has_audio: true,
        }
    }
}

impl Camera {
    /// Build the camera, idle at 1080p.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `id` or `name` is empty.
    pub fn build(self, id: &str, name: &str) -> Result<Device, HomeSimError> {
        let mut builder = Device::builder()
            .id(id)
            .name(name)
            .device_type(DeviceType::Camera)
            .capability(Capability::Power)
            .capability(Capability::Video)
            .state("recording", false)
            .state("motion_detected", false)
            .state("resolution", "1080p");
        if self.has_motion_detection {
            builder = builder.capability(Capability::Motion);
        }
        if self.has_audio {
            builder = builder.capability(Capability::Audio);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::entity::{Entity, StateValue};

    #[test]
    fn should_have_all_capabilities_by_default() {
        let camera = Camera::default().build("cam-1", "Front Camera").unwrap();
        for capability in [
            Capability::Power,
            Capability::Video,
            Capability::Motion,
            Capability::Audio,
        ] {
            assert!(camera.supports_capability(capability));
        }
        assert_eq!(camera.state()["resolution"], StateValue::from("1080p"));
    }

    #[test]
    fn should_drop_optional_capabilities() {
        let camera = Camera {
            has_motion_detection: false,
            has_audio: false,
        }
        .build("cam-2", "Garage Camera")
        .unwrap();
        assert!(!camera.supports_capability(Capability::Motion));
        assert!(!camera.supports_capability(Capability::Audio));
        // The motion flag stays in state even without the capability.
        assert!(camera.state().contains_key("motion_detected"));
    }
}
