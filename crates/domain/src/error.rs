//! Common error types used across the workspace.
//!
//! Expected domain outcomes (a rejected state update, a schedule in the past)
//! are reported as `bool` by the operations themselves. The types here cover
//! what is genuinely exceptional: invalid construction input, failed lookups,
//! and listeners that fail while handling an event.

/// Top-level error for the homesim crates.
#[derive(Debug, thiserror::Error)]
pub enum HomeSimError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("listener failed")]
    Listener(#[from] ListenerError),
}

/// Invalid input rejected at construction or parse time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("invalid range for {key}: min {min} is greater than max {max}")]
    InvalidRange { key: String, min: f64, max: f64 },

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("unknown device factory: {0}")]
    UnknownFactory(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A listener failed while handling an event.
///
/// The router does not isolate listeners from each other: the first failure
/// aborts the dispatch and is returned to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener {listener} failed: {message}")]
pub struct ListenerError {
    pub listener: String,
    pub message: String,
}

impl ListenerError {
    #[must_use]
    pub fn new(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            message: message.into(),
        }
    }
}
