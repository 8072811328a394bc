//! Event — an immutable record of something that happened.
//!
//! Events are produced by notification decorators when device state changes,
//! or injected by external callers (simulated sensors, the control surface).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EventId;
use crate::time::Timestamp;

/// Open payload attached to an event.
pub type EventData = serde_json::Map<String, serde_json::Value>;

/// The closed set of event kinds routed through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DeviceStateChanged,
    MotionDetected,
    DoorOpened,
    DoorClosed,
    TemperatureThresholdReached,
    HumidityThresholdReached,
    LightLevelChanged,
    SystemAlert,
    UserPresence,
    UserAbsence,
    ScheduledEvent,
}

impl EventType {
    pub const ALL: [Self; 11] = [
        Self::DeviceStateChanged,
        Self::MotionDetected,
        Self::DoorOpened,
        Self::DoorClosed,
        Self::TemperatureThresholdReached,
        Self::HumidityThresholdReached,
        Self::LightLevelChanged,
        Self::SystemAlert,
        Self::UserPresence,
        Self::UserAbsence,
        Self::ScheduledEvent,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceStateChanged => "device_state_changed",
            Self::MotionDetected => "motion_detected",
            Self::DoorOpened => "door_opened",
            Self::DoorClosed => "door_closed",
            Self::TemperatureThresholdReached => "temperature_threshold_reached",
            Self::HumidityThresholdReached => "humidity_threshold_reached",
            Self::LightLevelChanged => "light_level_changed",
            Self::SystemAlert => "system_alert",
            Self::UserPresence => "user_presence",
            Self::UserAbsence => "user_absence",
            Self::ScheduledEvent => "scheduled_event",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    /// Accepts `motion_detected`, `MOTION_DETECTED` and `motion-detected`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownEventType(s.to_string()))
    }
}

/// Something that happened, attributed to a source.
///
/// Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    event_type: EventType,
    source: String,
    timestamp: Timestamp,
    #[serde(default)]
    data: EventData,
}

impl Event {
    /// An event stamped now with an empty payload.
    #[must_use]
    pub fn new(event_type: EventType, source: impl Into<String>) -> Self {
        Self::builder(event_type, source).build()
    }

    #[must_use]
    pub fn builder(event_type: EventType, source: impl Into<String>) -> EventBuilder {
        EventBuilder {
            id: None,
            event_type,
            source: source.into(),
            timestamp: None,
            data: EventData::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[must_use]
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// String payload field, if present and a string.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Builder for [`Event`]; unset timestamp defaults to now.
#[derive(Debug)]
pub struct EventBuilder {
    id: Option<EventId>,
    event_type: EventType,
    source: String,
    timestamp: Option<Timestamp>,
    data: EventData,
}

impl EventBuilder {
    #[must_use]
    pub fn id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Add a single payload field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replace the payload. Non-object values are ignored.
    #[must_use]
    pub fn data(mut self, data: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: self.id.unwrap_or_default(),
            event_type: self.event_type,
            source: self.source,
            timestamp: self.timestamp.unwrap_or_else(crate::time::now),
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_default_timestamp_and_data() {
        let before = now();
        let event = Event::new(EventType::MotionDetected, "sensor-1");
        assert!(event.timestamp() >= before);
        assert!(event.data().is_empty());
        assert_eq!(event.source(), "sensor-1");
    }

    #[test]
    fn should_keep_explicit_timestamp_and_payload() {
        let ts = now();
        let event = Event::builder(EventType::SystemAlert, "system")
            .timestamp(ts)
            .data(serde_json::json!({"severity": "critical"}))
            .field("message", "Power outage detected")
            .build();

        assert_eq!(event.timestamp(), ts);
        assert_eq!(event.data_str("severity"), Some("critical"));
        assert_eq!(event.data_str("message"), Some("Power outage detected"));
    }

    #[test]
    fn should_parse_event_type_in_several_spellings() {
        assert_eq!(
            "MOTION_DETECTED".parse::<EventType>().unwrap(),
            EventType::MotionDetected
        );
        assert_eq!(
            "door-opened".parse::<EventType>().unwrap(),
            EventType::DoorOpened
        );
        assert_eq!(
            "system_alert".parse::<EventType>().unwrap(),
            EventType::SystemAlert
        );
    }

    #[test]
    fn should_reject_unknown_event_type() {
        let err = "earthquake".parse::<EventType>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownEventType("earthquake".into()));
    }

    #[test]
    fn should_list_every_event_type_once() {
        let unique: std::collections::BTreeSet<_> = EventType::ALL.into_iter().collect();
        assert_eq!(unique.len(), 11);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let event = Event::builder(EventType::DoorOpened, "lock-front-1")
            .field("user", "alice")
            .build();
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
