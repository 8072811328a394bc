//! # homesim-domain
//!
//! Pure domain model for the homesim smart-device simulation.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps and clocks
//! - Define **Capabilities** and **Device types** (closed vocabularies)
//! - Define the **Entity** contract (identity, capabilities, closed state bag)
//!   and the base **Device** implementing it
//! - Define **Events** (typed, immutable records routed to listeners)
//! - Define **History records** (per-key diffs of successful updates)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod error;
pub mod id;
pub mod time;

pub mod capability;
pub mod entity;
pub mod entity_history;
pub mod event;
