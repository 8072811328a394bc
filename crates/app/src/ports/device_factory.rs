//! Device factory port — builds entities from simple key/value configuration.

use homesim_domain::entity::{Entity, StateMap, StateValue};
use homesim_domain::error::HomeSimError;

/// Factory configuration: kind-specific keys, absent keys take defaults.
pub type FactoryConfig = StateMap;

/// An owned, sendable entity as produced by factories and held by services.
pub type BoxedEntity = Box<dyn Entity + Send>;

/// Creates entities of one family (lighting, climate, …).
pub trait DeviceFactory {
    /// Build an entity with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSimError::Validation`] when `id` or `name` is empty or
    /// the configuration describes an impossible device.
    fn create(
        &self,
        id: &str,
        name: &str,
        config: Option<&FactoryConfig>,
    ) -> Result<BoxedEntity, HomeSimError>;
}

/// Boolean configuration value, or `default` when absent or not a boolean.
#[must_use]
pub fn config_bool(config: Option<&FactoryConfig>, key: &str, default: bool) -> bool {
    config
        .and_then(|cfg| cfg.get(key))
        .and_then(StateValue::as_bool)
        .unwrap_or(default)
}

/// Numeric configuration value, or `default` when absent or not numeric.
#[must_use]
pub fn config_f64(config: Option<&FactoryConfig>, key: &str, default: f64) -> f64 {
    config
        .and_then(|cfg| cfg.get(key))
        .and_then(StateValue::as_f64)
        .unwrap_or(default)
}

/// String configuration value, or `default` when absent or not a string.
#[must_use]
pub fn config_str<'a>(config: Option<&'a FactoryConfig>, key: &str, default: &'a str) -> &'a str {
    config
        .and_then(|cfg| cfg.get(key))
        .and_then(StateValue::as_str)
        .unwrap_or(default)
}
