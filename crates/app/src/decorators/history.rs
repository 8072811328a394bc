//! History decorator: a bounded log of the changes each update made.

use std::collections::VecDeque;
use std::sync::Arc;

use homesim_domain::capability::{Capability, CapabilitySet, DeviceType};
use homesim_domain::entity::{Entity, StateMap, StateValue};
use homesim_domain::entity_history::HistoryRecord;
use homesim_domain::time::{Clock, SystemClock, Timestamp};

/// Records kept per entity unless configured otherwise.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Synthetic state key: always `true` on a recording entity.
pub const HAS_HISTORY_KEY: &str = "has_history";

/// Wraps an entity and remembers what every successful update changed.
///
/// Rejected updates and updates that change nothing leave no record. When
/// the bound is exceeded the oldest records are dropped first.
pub struct HistoryDecorator<E> {
    inner: E,
    records: VecDeque<HistoryRecord>,
    max_history: usize,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> HistoryDecorator<E> {
    #[must_use]
    pub fn new(inner: E) -> Self {
        Self::with_max_history(inner, DEFAULT_MAX_HISTORY)
    }

    #[must_use]
    pub fn with_max_history(inner: E, max_history: usize) -> Self {
        Self {
            inner,
            records: VecDeque::new(),
            max_history,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// A copy of the stored records, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn clear_history(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn record(&mut self, record: HistoryRecord) {
        self.records.push_back(record);
        while self.records.len() > self.max_history {
            self.records.pop_front();
        }
    }
}

impl<E: Entity> Entity for HistoryDecorator<E> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn device_type(&self) -> DeviceType {
        self.inner.device_type()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.inner.capabilities()
    }

    fn state(&self) -> StateMap {
        let mut state = self.inner.state();
        state.insert(HAS_HISTORY_KEY.to_string(), StateValue::Bool(true));
        state
    }

    fn set_state(&mut self, patch: &StateMap) -> bool {
        let before = self.inner.state();
        if !self.inner.set_state(patch) {
            return false;
        }
        if let Some(record) = HistoryRecord::from_patch(&before, patch, self.clock.now()) {
            tracing::trace!(
                device = self.inner.id(),
                changes = record.changes.len(),
                "history recorded"
            );
            self.record(record);
        }
        true
    }

    fn supports_capability(&self, capability: Capability) -> bool {
        self.inner.supports_capability(capability)
    }

    fn run_due_actions(&mut self) -> usize {
        self.inner.run_due_actions()
    }

    fn schedule_action(&mut self, at: Timestamp, patch: StateMap) -> bool {
        self.inner.schedule_action(at, patch)
    }

    fn state_history(&self) -> Vec<HistoryRecord> {
        self.history()
    }
}
