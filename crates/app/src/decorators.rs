//! Entity decorators — stackable behaviours layered over any [`Entity`].
//!
//! Each decorator owns an inner entity, forwards identity, capabilities and
//! updates to it, and adds its own synthetic keys to the reported state.
//! Decorators nest in any order:
//!
//! ```
//! use homesim_app::decorators::{HistoryDecorator, TimerDecorator};
//! use homesim_domain::entity::{Device, Entity, state_map};
//!
//! let light = Device::builder().id("light-1").name("Lamp").build().unwrap();
//! let mut stacked = TimerDecorator::new(HistoryDecorator::new(light));
//! assert!(stacked.set_state(&state_map([("power", true.into())])));
//! assert_eq!(stacked.inner().history().len(), 1);
//! ```
//!
//! [`Entity`]: homesim_domain::entity::Entity

pub mod history;
pub mod notification;
pub mod timer;

pub use history::{DEFAULT_MAX_HISTORY, HistoryDecorator};
pub use notification::{Always, NotificationDecorator, NotifyCriteria, OnChange};
pub use timer::{ScheduledAction, TimerDecorator};
