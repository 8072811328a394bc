//! Port definitions — traits that adapters and listeners implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod device_factory;
pub mod event_bus;
pub mod listener;
pub mod notification_sink;

pub use device_factory::{BoxedEntity, DeviceFactory, FactoryConfig};
pub use event_bus::EventPublisher;
pub use listener::EventListener;
pub use notification_sink::NotificationSink;
