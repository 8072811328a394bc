//! Device factories — one per device family, configured by key/value maps.

use std::fmt;
use std::str::FromStr;

use homesim_app::ports::device_factory::{config_bool, config_f64, config_str};
use homesim_app::ports::{BoxedEntity, DeviceFactory, FactoryConfig};
use homesim_domain::capability::DeviceType;
use homesim_domain::entity::Entity;
use homesim_domain::error::{HomeSimError, ValidationError};

use crate::devices::{Camera, SmartLight, Thermostat, motion_sensor, smart_lock};

/// Builds [`SmartLight`]s.
///
/// Config: `dimmable` (default `true`), `color_adjustable` (default `false`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LightingFactory;

impl DeviceFactory for LightingFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError> {
        let defaults = SmartLight::default();
        let light = SmartLight {
            dimmable: config_bool(config, "dimmable", defaults.dimmable),
            color_adjustable: config_bool(config, "color_adjustable", defaults.color_adjustable),
        };
        Ok(Box::new(light.build(id, name)?))
    }
}

/// Builds [`Thermostat`]s.
///
/// Config: `min_temp` (default `10.0`), `max_temp` (default `32.0`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateFactory;

impl DeviceFactory for ClimateFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError> {
        let defaults = Thermostat::default();
        let thermostat = Thermostat {
            min_temp: config_f64(config, "min_temp", defaults.min_temp),
            max_temp: config_f64(config, "max_temp", defaults.max_temp),
        };
        Ok(Box::new(thermostat.build(id, name)?))
    }
}

/// Builds locks, or cameras when `device_subtype = "camera"`.
///
/// Camera config: `has_motion_detection`, `has_audio` (both default `true`).
/// Any other subtype yields a lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityFactory;

impl DeviceFactory for SecurityFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError> {
        if config_str(config, "device_subtype", "lock") == "camera" {
            let defaults = Camera::default();
            let camera = Camera {
                has_motion_detection: config_bool(
                    config,
                    "has_motion_detection",
                    defaults.has_motion_detection,
                ),
                has_audio: config_bool(config, "has_audio", defaults.has_audio),
            };
            return Ok(Box::new(camera.build(id, name)?));
        }
        Ok(Box::new(smart_lock(id, name)?))
    }
}

/// Builds sensors. Only motion sensors exist; `sensor_type` is accepted
/// for forward compatibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorFactory;

impl DeviceFactory for SensorFactory {
    fn create(
        &self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError> {
        let sensor_type = config_str(config, "sensor_type", "motion");
        if sensor_type != "motion" {
            tracing::warn!(id, sensor_type, "unsupported sensor type, building a motion sensor");
        }
        Ok(Box::new(motion_sensor(id, name)?))
    }
}

/// The device families a factory exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKind {
    Lighting,
    Climate,
    Security,
    Sensor,
}

impl FactoryKind {
    pub const ALL: [Self; 4] = [Self::Lighting, Self::Climate, Self::Security, Self::Sensor];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lighting => "lighting",
            Self::Climate => "climate",
            Self::Security => "security",
            Self::Sensor => "sensor",
        }
    }

    /// The family responsible for a device type, if any.
    #[must_use]
    pub fn for_device_type(device_type: DeviceType) -> Option<Self> {
        match device_type {
            DeviceType::Light => Some(Self::Lighting),
            DeviceType::Thermostat => Some(Self::Climate),
            DeviceType::Lock | DeviceType::Camera => Some(Self::Security),
            DeviceType::Sensor => Some(Self::Sensor),
            DeviceType::Speaker => None,
        }
    }

    #[must_use]
    pub fn factory(self) -> &'static (dyn DeviceFactory + Send + Sync) {
        match self {
            Self::Lighting => &LightingFactory,
            Self::Climate => &ClimateFactory,
            Self::Security => &SecurityFactory,
            Self::Sensor => &SensorFactory,
        }
    }

    /// Shortcut for `self.factory().create(..)`.
    ///
    /// # Errors
    ///
    /// See [`DeviceFactory::create`].
    pub fn create(
        self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError> {
        let entity = self.factory().create(id, name, config)?;
        tracing::debug!(kind = %self, id, device_type = %entity.device_type(), "device created");
        Ok(entity)
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactoryKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownFactory(s.to_string()))
    }
}
