//! # homesim-adapter-virtual
//!
//! Simulated devices and the factories that build them.
//!
//! ## Provided devices
//!
//! | Factory | Device | State keys | Validation |
//! |---------|--------|------------|------------|
//! | `lighting` | Smart light | `power`, `brightness`, `color`*, `color_temperature`* | — |
//! | `climate` | Thermostat | `power`, `current_temperature`, `target_temperature`, `mode`, `humidity` | `target_temperature` in `[min_temp, max_temp]` |
//! | `security` | Smart lock | `power`, `locked`, `battery_level`, `last_user` | — |
//! | `security` (`device_subtype = "camera"`) | Camera | `power`, `recording`, `motion_detected`, `resolution` | — |
//! | `sensor` | Motion sensor | `power`, `motion_detected`, `sensitivity`, `battery_level` | — |
//!
//! \* only on colour-adjustable lights.
//!
//! ## Dependency rule
//!
//! Depends on `homesim-app` (port traits) and `homesim-domain` only.

pub mod devices;
mod factory;

pub use factory::{ClimateFactory, FactoryKind, LightingFactory, SecurityFactory, SensorFactory};
