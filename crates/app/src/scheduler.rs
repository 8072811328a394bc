//! Schedule runner — periodically fires scheduled state changes.
//!
//! [`TimerDecorator`](crate::decorators::TimerDecorator) only stores
//! schedules. The runner is the clock-driven side: every tick it asks the
//! [`DeviceService`] to apply whatever came due.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ports::EventPublisher;
use crate::services::DeviceService;

/// Drives due schedules of a shared [`DeviceService`].
pub struct ScheduleRunner<P> {
    service: Arc<Mutex<DeviceService<P>>>,
}

impl<P> Clone for ScheduleRunner<P> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<P: EventPublisher> ScheduleRunner<P> {
    pub fn new(service: Arc<Mutex<DeviceService<P>>>) -> Self {
        Self { service }
    }

    /// Fire everything due right now, returning how many changes fired.
    pub fn tick(&self) -> usize {
        let fired = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fire_due_schedules();
        if fired > 0 {
            tracing::debug!(fired, "scheduled changes applied");
        }
        fired
    }

    /// Tick every `period` until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(?period, "schedule runner started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }
        tracing::info!("schedule runner stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesim_domain::capability::DeviceType;
    use homesim_domain::entity::{Device, Entity, StateValue, state_map};
    use homesim_domain::error::ListenerError;
    use homesim_domain::event::Event;
    use homesim_domain::time::{Clock, ManualClock};

    use crate::decorators::TimerDecorator;

    struct NullPublisher;

    impl EventPublisher for NullPublisher {
        fn publish(&self, _event: Event) -> Result<(), ListenerError> {
            Ok(())
        }
    }

    fn service_with_timed_light(
        clock: &Arc<ManualClock>,
    ) -> Arc<Mutex<DeviceService<NullPublisher>>> {
        let light = Device::builder()
            .id("light-living-1")
            .name("Living Room Light")
            .device_type(DeviceType::Light)
            .build()
            .unwrap();
        let mut timed = TimerDecorator::with_clock(light, clock.clone());
        assert!(timed.schedule_action(
            clock.now() + chrono::Duration::seconds(30),
            state_map([("power", true.into())])
        ));
        assert_eq!(timed.state()["power"], StateValue::Bool(false));

        let mut service = DeviceService::new(NullPublisher);
        service.register(Box::new(timed)).unwrap();
        Arc::new(Mutex::new(service))
    }

    fn power_of(service: &Arc<Mutex<DeviceService<NullPublisher>>>) -> StateValue {
        service.lock().unwrap().get_state("light-living-1").unwrap()["power"].clone()
    }

    #[test]
    fn should_fire_only_once_due() {
        let clock = Arc::new(ManualClock::default());
        let service = service_with_timed_light(&clock);
        let runner = ScheduleRunner::new(service.clone());

        assert_eq!(runner.tick(), 0);
        clock.advance(chrono::Duration::seconds(31));
        assert_eq!(runner.tick(), 1);
        assert_eq!(runner.tick(), 0);
        assert_eq!(power_of(&service), StateValue::Bool(true));
    }

    #[tokio::test(start_paused = true)]
    async fn should_fire_in_background_and_stop_on_shutdown() {
        let clock = Arc::new(ManualClock::default());
        let service = service_with_timed_light(&clock);
        clock.advance(chrono::Duration::minutes(1));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(
            ScheduleRunner::new(service.clone()).run(Duration::from_millis(100), rx),
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(power_of(&service), StateValue::Bool(true));

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_when_shutdown_sender_is_dropped() {
        let clock = Arc::new(ManualClock::default());
        let service = service_with_timed_light(&clock);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(ScheduleRunner::new(service).run(Duration::from_secs(1), rx));
        drop(tx);
        handle.await.unwrap();
    }
}
