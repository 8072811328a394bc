//! Capabilities and device types — the closed vocabularies describing what a
//! device is and what it can do.
//!
//! Both enumerations are part of the public contract: adding a variant is a
//! breaking change.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A facet of device functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Can be turned on/off.
    Power,
    /// Has adjustable brightness.
    Brightness,
    /// Has adjustable color.
    Color,
    /// Can sense or set temperature.
    Temperature,
    /// Can detect motion.
    Motion,
    /// Can play or record audio.
    Audio,
    /// Can capture or display video.
    Video,
    /// Can lock/unlock.
    LockUnlock,
}

/// The fixed capability set of a device.
pub type CapabilitySet = BTreeSet<Capability>;

impl Capability {
    pub const ALL: [Self; 8] = [
        Self::Power,
        Self::Brightness,
        Self::Color,
        Self::Temperature,
        Self::Motion,
        Self::Audio,
        Self::Video,
        Self::LockUnlock,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Brightness => "brightness",
            Self::Color => "color",
            Self::Temperature => "temperature",
            Self::Motion => "motion",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::LockUnlock => "lock_unlock",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|cap| cap.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCapability(s.to_string()))
    }
}

/// The kind of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Thermostat,
    Lock,
    Camera,
    Speaker,
    Sensor,
}

impl DeviceType {
    pub const ALL: [Self; 6] = [
        Self::Light,
        Self::Thermostat,
        Self::Lock,
        Self::Camera,
        Self::Speaker,
        Self::Sensor,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Lock => "lock",
            Self::Camera => "camera",
            Self::Speaker => "speaker",
            Self::Sensor => "sensor",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownDeviceType(s.to_string()))
    }
}
