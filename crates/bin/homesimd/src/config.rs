//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homesim.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use homesim_adapter_virtual::FactoryKind;
use homesim_app::decorators::DEFAULT_MAX_HISTORY;
use homesim_app::listeners::{DEFAULT_MAX_LOG_SIZE, DEFAULT_NOTIFICATION_TYPES};
use homesim_domain::entity::{StateMap, state_map};
use homesim_domain::event::EventType;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// History decorator settings.
    pub history: HistoryConfig,
    /// Event log listener settings.
    pub event_log: EventLogConfig,
    /// Notification service settings.
    pub notifications: NotificationsConfig,
    /// Schedule runner settings.
    pub scheduler: SchedulerConfig,
    /// Devices to simulate. Empty means the demo set.
    pub devices: Vec<DeviceConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Bound applied to every history decorator.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

/// Bound of the event log.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    pub max_entries: usize,
}

/// Event types turned into user notifications.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub event_types: Vec<EventType>,
}

/// How often due schedules are fired.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_ms: u64,
}

/// Decorators that can be layered over a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorKind {
    Timer,
    History,
    Notification,
}

/// One simulated device.
///
/// `decorators` are applied in order, the first one wrapping the bare device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    /// Factory family: `lighting`, `climate`, `security` or `sensor`.
    pub kind: String,
    #[serde(default)]
    pub decorators: Vec<DecoratorKind>,
    /// Factory configuration passed through unchanged.
    #[serde(default)]
    pub config: StateMap,
    /// Changes scheduled at startup; needs the `timer` decorator.
    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,
}

/// A state change applied `after_secs` seconds after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub after_secs: u64,
    pub state: StateMap,
}

impl Config {
    /// Load configuration from `homesim.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homesim.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HOMESIM_HISTORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.history.max_entries = limit;
            }
        }
        if let Ok(val) = std::env::var("HOMESIM_EVENT_LOG_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.event_log.max_entries = limit;
            }
        }
        if let Ok(val) = std::env::var("HOMESIM_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_entries == 0 {
            return Err(ConfigError::Validation(
                "history.max_entries must be non-zero".to_string(),
            ));
        }
        if self.event_log.max_entries == 0 {
            return Err(ConfigError::Validation(
                "event_log.max_entries must be non-zero".to_string(),
            ));
        }
        if self.scheduler.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "scheduler.tick_ms must be non-zero".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate device id {:?}",
                    device.id
                )));
            }
            device.validate()?;
        }
        Ok(())
    }

    /// Interval between two runs of the schedule runner.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_ms)
    }

    /// `true` when no device is configured and the demo set is used.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.devices.is_empty()
    }

    /// The configured devices, or the demo set when none are configured.
    #[must_use]
    pub fn device_set(&self) -> Vec<DeviceConfig> {
        if self.is_demo() {
            DeviceConfig::demo_set()
        } else {
            self.devices.clone()
        }
    }
}

impl DeviceConfig {
    /// Factory family named by `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown family.
    pub fn factory_kind(&self) -> Result<FactoryKind, ConfigError> {
        self.kind.parse().map_err(|err| {
            ConfigError::Validation(format!("device {:?}: {err}", self.id))
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.factory_kind()?;
        if !self.schedules.is_empty() && !self.decorators.contains(&DecoratorKind::Timer) {
            return Err(ConfigError::Validation(format!(
                "device {:?} has schedules but no timer decorator",
                self.id
            )));
        }
        if self.schedules.iter().any(|schedule| schedule.after_secs == 0) {
            return Err(ConfigError::Validation(format!(
                "device {:?}: schedules must be in the future",
                self.id
            )));
        }
        Ok(())
    }

    /// The five demonstration devices: a timed colour light, a thermostat
    /// keeping history, a notifying lock, a camera with history and
    /// notifications, and a bare motion sensor.
    #[must_use]
    pub fn demo_set() -> Vec<Self> {
        vec![
            Self {
                id: "light-living-1".to_string(),
                name: "Living Room Light".to_string(),
                kind: FactoryKind::Lighting.to_string(),
                decorators: vec![DecoratorKind::Timer],
                config: state_map([
                    ("dimmable", true.into()),
                    ("color_adjustable", true.into()),
                ]),
                schedules: Vec::new(),
            },
            Self {
                id: "therm-bed-1".to_string(),
                name: "Bedroom Thermostat".to_string(),
                kind: FactoryKind::Climate.to_string(),
                decorators: vec![DecoratorKind::History],
                config: state_map([("min_temp", 15.0.into()), ("max_temp", 28.0.into())]),
                schedules: Vec::new(),
            },
            Self {
                id: "lock-front-1".to_string(),
                name: "Front Door Lock".to_string(),
                kind: FactoryKind::Security.to_string(),
                decorators: vec![DecoratorKind::Notification],
                config: StateMap::new(),
                schedules: Vec::new(),
            },
            Self {
                id: "cam-front-1".to_string(),
                name: "Front Door Camera".to_string(),
                kind: FactoryKind::Security.to_string(),
                decorators: vec![DecoratorKind::History, DecoratorKind::Notification],
                config: state_map([
                    ("device_subtype", "camera".into()),
                    ("has_motion_detection", true.into()),
                ]),
                schedules: Vec::new(),
            },
            Self {
                id: "sensor-hall-1".to_string(),
                name: "Hallway Motion Sensor".to_string(),
                kind: FactoryKind::Sensor.to_string(),
                decorators: Vec::new(),
                config: StateMap::new(),
                schedules: Vec::new(),
            },
        ]
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homesimd=info,homesim=info".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_HISTORY,
        }
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_LOG_SIZE,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            event_types: DEFAULT_NOTIFICATION_TYPES.to_vec(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::entity::StateValue;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.filter, "homesimd=info,homesim=info");
        assert_eq!(config.history.max_entries, 100);
        assert_eq!(config.event_log.max_entries, 1000);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.notifications.event_types.len(), 3);
        assert!(config.is_demo());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.history.max_entries, 100);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [logging]
            filter = 'debug'

            [history]
            max_entries = 10

            [event_log]
            max_entries = 50

            [notifications]
            event_types = ['door_opened', 'device_state_changed']

            [scheduler]
            tick_ms = 250

            [[devices]]
            id = 'light-1'
            name = 'Desk Lamp'
            kind = 'lighting'
            decorators = ['history', 'timer']
            config = { dimmable = false }

            [[devices.schedules]]
            after_secs = 60
            state = { power = true }
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.history.max_entries, 10);
        assert_eq!(config.event_log.max_entries, 50);
        assert_eq!(
            config.notifications.event_types,
            vec![EventType::DoorOpened, EventType::DeviceStateChanged]
        );
        assert_eq!(config.tick_period(), Duration::from_millis(250));
        assert!(!config.is_demo());

        let device = &config.devices[0];
        assert_eq!(device.factory_kind().unwrap(), FactoryKind::Lighting);
        assert_eq!(
            device.decorators,
            vec![DecoratorKind::History, DecoratorKind::Timer]
        );
        assert_eq!(device.config["dimmable"], StateValue::Bool(false));
        assert_eq!(device.schedules[0].after_secs, 60);
        assert_eq!(device.schedules[0].state["power"], StateValue::Bool(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.event_log.max_entries, 1000);
    }

    #[test]
    fn should_reject_zero_bounds() {
        let mut config = Config::default();
        config.history.max_entries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.event_log.max_entries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scheduler.tick_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_unknown_device_kind() {
        let toml = "
            [[devices]]
            id = 'pipe-1'
            name = 'Pipe'
            kind = 'plumbing'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plumbing"));
    }

    #[test]
    fn should_reject_schedules_without_timer() {
        let toml = "
            [[devices]]
            id = 'therm-1'
            name = 'Thermostat'
            kind = 'climate'
            decorators = ['history']

            [[devices.schedules]]
            after_secs = 30
            state = { target_temperature = 19.0 }
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_duplicate_device_ids() {
        let toml = "
            [[devices]]
            id = 'sensor-1'
            name = 'Hall'
            kind = 'sensor'

            [[devices]]
            id = 'sensor-1'
            name = 'Kitchen'
            kind = 'sensor'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_fall_back_to_demo_devices() {
        let config = Config::default();
        let ids: Vec<_> = config.device_set().into_iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                "light-living-1",
                "therm-bed-1",
                "lock-front-1",
                "cam-front-1",
                "sensor-hall-1"
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_unknown_decorator() {
        let toml = "
            [[devices]]
            id = 'light-1'
            name = 'Lamp'
            kind = 'lighting'
            decorators = ['cache']
        ";
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
