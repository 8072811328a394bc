//! Wiring — builds the router, listeners and decorated devices from [`Config`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;

use homesim_app::decorators::{HistoryDecorator, NotificationDecorator, TimerDecorator};
use homesim_app::event_bus::EventRouter;
use homesim_app::listeners::{EventLog, NotificationService};
use homesim_app::ports::BoxedEntity;
use homesim_app::scheduler::ScheduleRunner;
use homesim_app::services::DeviceService;
use homesim_domain::entity::Entity;
use homesim_domain::time::{self, Timestamp};

use crate::config::{Config, DecoratorKind, DeviceConfig};

pub type SharedDevices = Arc<Mutex<DeviceService<Arc<EventRouter>>>>;

/// Everything the daemon runs: one router, its two listeners and the devices.
pub struct Home {
    pub router: Arc<EventRouter>,
    pub event_log: Arc<EventLog>,
    pub notifications: Arc<NotificationService>,
    pub devices: SharedDevices,
}

impl Home {
    /// Build the listeners and every device of [`Config::device_set`].
    ///
    /// # Errors
    ///
    /// Fails when a device cannot be created, registered or scheduled.
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let router = Arc::new(EventRouter::new());

        let event_log = Arc::new(EventLog::new().with_max_entries(config.event_log.max_entries));
        let notifications = Arc::new(
            NotificationService::new()
                .with_event_types(config.notifications.event_types.iter().copied()),
        );
        router.subscribe(event_log.clone());
        router.subscribe(notifications.clone());

        let mut service = DeviceService::new(Arc::clone(&router));
        let started_at = time::now();
        for device in config.device_set() {
            let entity = build_device(&device, &router, config.history.max_entries, started_at)
                .with_context(|| format!("unable to set up device {:?}", device.id))?;
            service.register(entity)?;
        }
        tracing::info!(devices = service.len(), demo = config.is_demo(), "home ready");

        Ok(Self {
            router,
            event_log,
            notifications,
            devices: Arc::new(Mutex::new(service)),
        })
    }

    /// A runner firing the schedules of this home's devices.
    #[must_use]
    pub fn schedule_runner(&self) -> ScheduleRunner<Arc<EventRouter>> {
        ScheduleRunner::new(Arc::clone(&self.devices))
    }

    pub fn lock_devices(&self) -> MutexGuard<'_, DeviceService<Arc<EventRouter>>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a device, wrap it in its decorators (first listed innermost) and
/// register its startup schedules relative to `started_at`.
fn build_device(
    device: &DeviceConfig,
    router: &Arc<EventRouter>,
    max_history: usize,
    started_at: Timestamp,
) -> anyhow::Result<BoxedEntity> {
    let factory_config = (!device.config.is_empty()).then_some(&device.config);
    let entity = device
        .factory_kind()?
        .create(&device.id, &device.name, factory_config)?;

    let mut entity = device
        .decorators
        .iter()
        .fold(entity, |inner, decorator| -> BoxedEntity {
            match decorator {
                DecoratorKind::Timer => Box::new(TimerDecorator::new(inner)),
                DecoratorKind::History => {
                    Box::new(HistoryDecorator::with_max_history(inner, max_history))
                }
                DecoratorKind::Notification => {
                    Box::new(NotificationDecorator::new(inner, Arc::clone(router)))
                }
            }
        });

    for schedule in &device.schedules {
        let at = chrono::Duration::from_std(std::time::Duration::from_secs(schedule.after_secs))
            .ok()
            .and_then(|delay| started_at.checked_add_signed(delay))
            .with_context(|| format!("schedule after {}s is out of range", schedule.after_secs))?;
        if !entity.schedule_action(at, schedule.state.clone()) {
            anyhow::bail!("schedule after {}s refused", schedule.after_secs);
        }
    }
    Ok(entity)
}
