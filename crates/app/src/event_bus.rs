//! In-process event router with per-type subscriber registries.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use homesim_domain::error::ListenerError;
use homesim_domain::event::{Event, EventType};

use crate::ports::{EventListener, EventPublisher};

type Registry = HashMap<EventType, HashSet<ListenerHandle>>;

/// A registered listener, compared by the address of its allocation.
#[derive(Clone)]
struct ListenerHandle(Arc<dyn EventListener>);

impl ListenerHandle {
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for ListenerHandle {}

impl Hash for ListenerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.addr(), state);
    }
}

/// Routes events to the listeners subscribed to their type.
///
/// Every [`EventType`] has a registry entry from construction on, possibly
/// empty. A listener appears at most once per type, so it is invoked at most
/// once per event.
///
/// Dispatch works on a snapshot taken under the lock; listeners run with the
/// lock released and may subscribe or unsubscribe without affecting the
/// dispatch in flight. No ordering is guaranteed between listeners.
pub struct EventRouter {
    registry: Mutex<Registry>,
}

impl EventRouter {
    /// Create a router with an empty subscriber set for every event type.
    #[must_use]
    pub fn new() -> Self {
        let registry = EventType::ALL
            .into_iter()
            .map(|event_type| (event_type, HashSet::new()))
            .collect();
        Self {
            registry: Mutex::new(registry),
        }
    }

    /// Register `listener` for every type it declares interest in.
    ///
    /// Interests are read once, here. Subscribing an already registered
    /// listener is a no-op per type.
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        let event_types = listener.subscribed_event_types();
        let handle = ListenerHandle(listener);
        let mut registry = self.lock_registry();
        for event_type in &event_types {
            registry
                .entry(*event_type)
                .or_default()
                .insert(handle.clone());
        }
        tracing::debug!(
            listener = handle.0.name(),
            types = event_types.len(),
            "listener subscribed"
        );
    }

    /// Remove `listener` from every registry set. No-op when absent.
    pub fn unsubscribe<L: EventListener + ?Sized>(&self, listener: &Arc<L>) {
        let addr = Arc::as_ptr(listener).cast::<()>();
        let mut registry = self.lock_registry();
        for listeners in registry.values_mut() {
            listeners.retain(|handle| !std::ptr::eq(handle.addr(), addr));
        }
        tracing::debug!(listener = listener.name(), "listener unsubscribed");
    }

    /// Unsubscribe then subscribe again, picking up changed interests.
    pub fn resubscribe(&self, listener: Arc<dyn EventListener>) {
        self.unsubscribe(&listener);
        self.subscribe(listener);
    }

    /// Deliver `event` to every listener subscribed to its type.
    ///
    /// # Errors
    ///
    /// Returns the first [`ListenerError`]; listeners after the failing one
    /// do not see the event.
    pub fn notify(&self, event: &Event) -> Result<(), ListenerError> {
        let snapshot: Vec<Arc<dyn EventListener>> = self
            .lock_registry()
            .get(&event.event_type())
            .map(|listeners| listeners.iter().map(|handle| handle.0.clone()).collect())
            .unwrap_or_default();

        tracing::debug!(
            event_type = %event.event_type(),
            source = event.source(),
            listeners = snapshot.len(),
            "dispatching event"
        );

        for listener in snapshot {
            listener.update(event).inspect_err(|err| {
                tracing::warn!(
                    event_type = %event.event_type(),
                    error = %err,
                    "listener failed, aborting dispatch"
                );
            })?;
        }
        Ok(())
    }

    /// Live registry sizes, one entry per event type.
    #[must_use]
    pub fn subscriber_count(&self) -> BTreeMap<EventType, usize> {
        self.lock_registry()
            .iter()
            .map(|(event_type, listeners)| (*event_type, listeners.len()))
            .collect()
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl EventPublisher for EventRouter {
    fn publish(&self, event: Event) -> Result<(), ListenerError> {
        self.notify(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        types: BTreeSet<EventType>,
        calls: AtomicUsize,
    }

    impl CountingListener {
        fn new(types: &[EventType]) -> Arc<Self> {
            Arc::new(Self {
                types: types.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EventListener for CountingListener {
        fn update(&self, _event: &Event) -> Result<(), ListenerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn subscribed_event_types(&self) -> BTreeSet<EventType> {
            self.types.clone()
        }
    }

    struct FailingListener;

    impl EventListener for FailingListener {
        fn name(&self) -> &str {
            "failing"
        }

        fn update(&self, _event: &Event) -> Result<(), ListenerError> {
            Err(ListenerError::new("failing", "boom"))
        }

        fn subscribed_event_types(&self) -> BTreeSet<EventType> {
            BTreeSet::from([EventType::SystemAlert])
        }
    }

    /// Unsubscribes a peer the first time it sees an event.
    struct UnsubscribingListener {
        router: Arc<EventRouter>,
        peer: Arc<CountingListener>,
    }

    impl EventListener for UnsubscribingListener {
        fn update(&self, _event: &Event) -> Result<(), ListenerError> {
            self.router.unsubscribe(&self.peer);
            Ok(())
        }

        fn subscribed_event_types(&self) -> BTreeSet<EventType> {
            BTreeSet::from([EventType::DoorOpened])
        }
    }

    /// Subscribes a peer every time it sees an event.
    struct SubscribingListener {
        router: Arc<EventRouter>,
        peer: Arc<CountingListener>,
    }

    impl EventListener for SubscribingListener {
        fn update(&self, _event: &Event) -> Result<(), ListenerError> {
            self.router.subscribe(self.peer.clone());
            Ok(())
        }

        fn subscribed_event_types(&self) -> BTreeSet<EventType> {
            BTreeSet::from([EventType::DoorOpened])
        }
    }

    #[test]
    fn should_initialize_every_event_type_with_zero_subscribers() {
        let router = EventRouter::new();
        let counts = router.subscriber_count();
        assert_eq!(counts.len(), EventType::ALL.len());
        assert!(counts.values().all(|count| *count == 0));
    }

    #[test]
    fn should_register_listener_for_each_declared_type() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::MotionDetected, EventType::DoorOpened]);
        router.subscribe(listener.clone());

        let counts = router.subscriber_count();
        assert_eq!(counts[&EventType::MotionDetected], 1);
        assert_eq!(counts[&EventType::DoorOpened], 1);
        assert_eq!(counts[&EventType::LightLevelChanged], 0);
    }

    #[test]
    fn should_not_duplicate_listener_when_subscribed_twice() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::MotionDetected]);
        router.subscribe(listener.clone());
        router.subscribe(listener.clone());

        assert_eq!(router.subscriber_count()[&EventType::MotionDetected], 1);

        router
            .notify(&Event::new(EventType::MotionDetected, "sensor"))
            .unwrap();
        assert_eq!(listener.calls(), 1);
    }

    #[test]
    fn should_remove_listener_from_every_type_when_unsubscribed() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::MotionDetected, EventType::DoorOpened]);
        router.subscribe(listener.clone());
        router.unsubscribe(&listener);

        let counts = router.subscriber_count();
        assert_eq!(counts[&EventType::MotionDetected], 0);
        assert_eq!(counts[&EventType::DoorOpened], 0);
    }

    #[test]
    fn should_ignore_unsubscribe_of_unknown_listener() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::MotionDetected]);
        router.unsubscribe(&listener);
        assert_eq!(router.subscriber_count()[&EventType::MotionDetected], 0);
    }

    #[test]
    fn should_deliver_only_to_interested_listeners() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::MotionDetected, EventType::DoorOpened]);
        router.subscribe(listener.clone());

        router
            .notify(&Event::new(EventType::SystemAlert, "system"))
            .unwrap();
        assert_eq!(listener.calls(), 0);

        router
            .notify(&Event::new(EventType::MotionDetected, "sensor"))
            .unwrap();
        assert_eq!(listener.calls(), 1);
    }

    #[test]
    fn should_succeed_when_no_listener_is_interested() {
        let router = EventRouter::new();
        assert!(
            router
                .notify(&Event::new(EventType::ScheduledEvent, "timer"))
                .is_ok()
        );
    }

    #[test]
    fn should_propagate_listener_failure() {
        let router = EventRouter::new();
        router.subscribe(Arc::new(FailingListener));

        let err = router
            .notify(&Event::new(EventType::SystemAlert, "system"))
            .unwrap_err();
        assert_eq!(err.listener, "failing");
    }

    #[test]
    fn should_dispatch_from_snapshot_when_listener_unsubscribes_a_peer() {
        let router = Arc::new(EventRouter::new());
        let peer = CountingListener::new(&[EventType::DoorOpened]);
        router.subscribe(peer.clone());
        router.subscribe(Arc::new(UnsubscribingListener {
            router: router.clone(),
            peer: peer.clone(),
        }));

        router
            .notify(&Event::new(EventType::DoorOpened, "door"))
            .unwrap();
        // Delivered from the snapshot whatever the iteration order was.
        assert_eq!(peer.calls(), 1);
        assert_eq!(router.subscriber_count()[&EventType::DoorOpened], 1);

        router
            .notify(&Event::new(EventType::DoorOpened, "door"))
            .unwrap();
        assert_eq!(peer.calls(), 1);
    }

    #[test]
    fn should_not_deliver_in_flight_event_to_peer_subscribed_during_dispatch() {
        let router = Arc::new(EventRouter::new());
        let peer = CountingListener::new(&[EventType::DoorOpened]);
        router.subscribe(Arc::new(SubscribingListener {
            router: router.clone(),
            peer: peer.clone(),
        }));

        router
            .notify(&Event::new(EventType::DoorOpened, "door"))
            .unwrap();
        assert_eq!(peer.calls(), 0);
        assert_eq!(router.subscriber_count()[&EventType::DoorOpened], 2);

        router
            .notify(&Event::new(EventType::DoorOpened, "door"))
            .unwrap();
        assert_eq!(peer.calls(), 1);
    }

    #[test]
    fn should_stay_consistent_under_concurrent_subscribe_and_notify() {
        const THREADS: usize = 4;
        const EVENTS: usize = 200;

        let router = EventRouter::new();
        let listeners: Vec<_> = (0..THREADS)
            .map(|_| CountingListener::new(&[EventType::MotionDetected]))
            .collect();

        std::thread::scope(|scope| {
            for listener in &listeners {
                let router = &router;
                scope.spawn(move || {
                    router.subscribe(listener.clone());
                    for _ in 0..EVENTS {
                        router
                            .notify(&Event::new(EventType::MotionDetected, "sensor"))
                            .unwrap();
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..EVENTS {
                    let transient = CountingListener::new(&[EventType::MotionDetected]);
                    router.subscribe(transient.clone());
                    router.unsubscribe(&transient);
                }
            });
        });

        assert_eq!(router.subscriber_count()[&EventType::MotionDetected], THREADS);
        for listener in &listeners {
            // Every event published after its own subscription reached it.
            assert!(listener.calls() >= EVENTS);
            assert!(listener.calls() <= THREADS * EVENTS);
        }
    }

    #[test]
    fn should_publish_through_port() {
        let router = EventRouter::new();
        let listener = CountingListener::new(&[EventType::UserPresence]);
        router.subscribe(listener.clone());

        router
            .publish(Event::new(EventType::UserPresence, "phone"))
            .unwrap();
        assert_eq!(listener.calls(), 1);
    }
}
