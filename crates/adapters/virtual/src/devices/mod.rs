//! Virtual device implementations — light, thermostat, lock, camera, motion sensor.
//!
//! Every device is a plain [`Device`](homesim_domain::entity::Device) whose
//! state keys, capabilities and validation rules are fixed here at build
//! time; decorators are layered on afterwards by the caller.

mod camera;
mod light;
mod lock;
mod motion_sensor;
mod thermostat;

pub use camera::Camera;
pub use light::SmartLight;
pub use lock::smart_lock;
pub use motion_sensor::motion_sensor;
pub use thermostat::{TARGET_TEMPERATURE, Thermostat};
