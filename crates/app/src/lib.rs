//! # homesim-app
//!
//! Application layer — in-process event routing, listeners, entity
//! decorators and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters and listeners implement:
//!   - `EventPublisher` — publish side of the event bus
//!   - `EventListener` — consumer with declared event-type interests
//!   - `NotificationSink` — where formatted notifications end up
//!   - `DeviceFactory` — builds entities from key/value configuration
//! - Provide the **event router** (per-type subscriber registries, synchronous dispatch)
//! - Provide the **listeners**: bounded event log, notification service
//! - Provide the **decorators** stacking timers, history and notifications
//!   over any entity
//! - Provide **use-cases**: `DeviceService` (register, list, update, inject
//!   events) and the `ScheduleRunner` firing due schedules
//!
//! ## Dependency rule
//! Depends on `homesim-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod decorators;
pub mod event_bus;
pub mod listeners;
pub mod ports;
pub mod scheduler;
pub mod services;
