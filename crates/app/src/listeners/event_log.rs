//! Append-only, bounded audit log of routed events.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use homesim_domain::error::ListenerError;
use homesim_domain::event::{Event, EventData, EventType};

use crate::ports::EventListener;

/// Default number of records kept by an [`EventLog`].
pub const DEFAULT_MAX_LOG_SIZE: usize = 1000;

/// One logged event, with its timestamp rendered as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub event_type: EventType,
    pub source: String,
    pub data: EventData,
}

impl From<&Event> for LogRecord {
    fn from(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp().to_rfc3339(),
            event_type: event.event_type(),
            source: event.source().to_string(),
            data: event.data().clone(),
        }
    }
}

/// Records every event it receives, keeping the most recent
/// `max_entries` and evicting the oldest first.
#[derive(Debug)]
pub struct EventLog {
    event_types: BTreeSet<EventType>,
    max_entries: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl EventLog {
    /// A log interested in every event type, bounded at [`DEFAULT_MAX_LOG_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_types: EventType::ALL.into_iter().collect(),
            max_entries: DEFAULT_MAX_LOG_SIZE,
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Restrict interest to `event_types`.
    #[must_use]
    pub fn with_event_types(mut self, event_types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types = event_types.into_iter().collect();
        self
    }

    /// Change the bound. A bound of zero keeps nothing.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// A copy of the log, oldest record first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock_records().iter().cloned().collect()
    }

    /// The `count` most recent records, oldest first.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<LogRecord> {
        let records = self.lock_records();
        let skip = records.len().saturating_sub(count);
        records.iter().skip(skip).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    pub fn clear(&self) {
        self.lock_records().clear();
    }

    fn lock_records(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListener for EventLog {
    fn name(&self) -> &str {
        "event_log"
    }

    fn update(&self, event: &Event) -> Result<(), ListenerError> {
        let mut records = self.lock_records();
        records.push_back(LogRecord::from(event));
        while records.len() > self.max_entries {
            records.pop_front();
        }
        Ok(())
    }

    fn subscribed_event_types(&self) -> BTreeSet<EventType> {
        self.event_types.clone()
    }
}
