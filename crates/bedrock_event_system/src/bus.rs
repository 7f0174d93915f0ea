//! Priority-ordered, synchronous event dispatch.
//!
//! Handlers are registered per event type with an [`EventPriority`] and are
//! invoked on the emitting thread, highest priority first. Handlers sharing a
//! priority run in registration order. A failing or panicking handler is
//! logged and skipped; it never prevents the remaining handlers from running
//! and never propagates to the emitter.

use crate::error::EventError;
use crate::events::Event;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Dispatch priority of a handler. Higher priorities are called first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventPriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
}

/// Type-erased handler stored by the bus.
///
/// Most users will not implement this trait directly, but register closures
/// through [`EventBus::on`], which wraps them in a [`TypedEventHandler`].
pub trait EventHandler: Send + Sync {
    /// Handles an event. The bus only hands over events whose `TypeId`
    /// matches [`EventHandler::expected_type_id`].
    fn handle(&self, event: &dyn Any) -> Result<(), EventError>;

    fn expected_type_id(&self) -> TypeId;

    /// Human-readable name for logging.
    fn handler_name(&self) -> &str;
}

/// Bridges a closure over a concrete event type to [`EventHandler`].
pub struct TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<(), EventError> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: std::marker::PhantomData<fn(&T)>,
}

impl<T, F> TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<(), EventError> + Send + Sync,
{
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> EventHandler for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(&T) -> Result<(), EventError> + Send + Sync,
{
    fn handle(&self, event: &dyn Any) -> Result<(), EventError> {
        let event = event
            .downcast_ref::<T>()
            .ok_or_else(|| EventError::TypeMismatch(self.name.clone()))?;
        (self.handler)(event)
    }

    fn expected_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone)]
struct Registration {
    priority: EventPriority,
    handler: Arc<dyn EventHandler>,
}

/// Counters kept by the bus.
#[derive(Debug, Default, Clone)]
pub struct EventSystemStats {
    /// Total number of registered event handlers
    pub total_handlers: usize,
    /// Total number of events emitted since creation
    pub events_emitted: u64,
    /// Handler invocations that returned an error or panicked
    pub handler_failures: u64,
}

/// The event bus shared by the host and all plugins.
pub struct EventBus {
    handlers: DashMap<TypeId, Vec<Registration>>,
    stats: RwLock<EventSystemStats>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.handlers.len())
            .field("stats", &*self.stats.read())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            stats: RwLock::new(EventSystemStats::default()),
        }
    }

    /// Registers `handler` for events of type `T` at the given priority.
    pub fn on<T, F>(&self, name: &str, priority: EventPriority, handler: F)
    where
        T: Event,
        F: Fn(&T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.register_handler(
            priority,
            Arc::new(TypedEventHandler::new(name.to_string(), handler)),
        );
        debug!(
            "Registered handler '{}' for {} at {:?} priority",
            name,
            T::type_name(),
            priority
        );
    }

    /// Registers an already type-erased handler under its expected event type.
    pub fn register_handler(&self, priority: EventPriority, handler: Arc<dyn EventHandler>) {
        {
            let mut registrations = self.handlers.entry(handler.expected_type_id()).or_default();
            // Keep the list sorted by descending priority, stable within a priority.
            let index = registrations
                .iter()
                .position(|r| r.priority < priority)
                .unwrap_or(registrations.len());
            registrations.insert(index, Registration { priority, handler });
        }
        self.stats.write().total_handlers += 1;
    }

    /// Dispatches `event` to every handler registered for `T`.
    ///
    /// Returns the number of handlers that completed successfully.
    pub fn emit<T: Event>(&self, event: &T) -> usize {
        // Snapshot so handlers may register further handlers while running.
        let registrations = self
            .handlers
            .get(&TypeId::of::<T>())
            .map(|list| list.value().clone())
            .unwrap_or_default();

        let mut completed = 0;
        let mut failures = 0;
        for registration in &registrations {
            let handler = &registration.handler;
            let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle(event.as_any())))
                .unwrap_or_else(|panic| Err(EventError::HandlerPanicked(panic_message(panic))));

            match outcome {
                Ok(()) => completed += 1,
                Err(e) => {
                    failures += 1;
                    error!(
                        "Handler '{}' failed while processing {}: {}",
                        handler.handler_name(),
                        T::type_name(),
                        e
                    );
                }
            }
        }

        let mut stats = self.stats.write();
        stats.events_emitted += 1;
        stats.handler_failures += failures;
        completed
    }

    /// Number of handlers registered for events of type `T`.
    pub fn handler_count<T: Event>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<T>())
            .map(|list| list.len())
            .unwrap_or(0)
    }

    pub fn get_stats(&self) -> EventSystemStats {
        self.stats.read().clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic_info: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct TestEvent {
        value: u32,
    }

    impl Event for TestEvent {
        fn type_name() -> &'static str {
            "TestEvent"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct OtherEvent;

    impl Event for OtherEvent {
        fn type_name() -> &'static str {
            "OtherEvent"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn recorder(
        log: &Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
    ) -> impl Fn(&TestEvent) -> Result<(), EventError> + Send + Sync + 'static {
        let log = log.clone();
        move |_event: &TestEvent| {
            log.lock().push(label);
            Ok(())
        }
    }

    #[test]
    fn test_higher_priority_runs_first() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("normal", EventPriority::Normal, recorder(&log, "normal"));
        bus.on("high", EventPriority::High, recorder(&log, "high"));
        bus.on("lowest", EventPriority::Lowest, recorder(&log, "lowest"));
        bus.on("highest", EventPriority::Highest, recorder(&log, "highest"));

        assert_eq!(bus.emit(&TestEvent { value: 1 }), 4);
        assert_eq!(*log.lock(), vec!["highest", "high", "normal", "lowest"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("first", EventPriority::Normal, recorder(&log, "first"));
        bus.on("second", EventPriority::Normal, recorder(&log, "second"));
        bus.on("early", EventPriority::High, recorder(&log, "early"));
        bus.on("third", EventPriority::Normal, recorder(&log, "third"));

        bus.emit(&TestEvent { value: 0 });
        assert_eq!(*log.lock(), vec!["early", "first", "second", "third"]);
    }

    #[test]
    fn test_failing_handlers_do_not_stop_dispatch() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("errors", EventPriority::Highest, |_event: &TestEvent| {
            Err(EventError::HandlerExecution("boom".to_string()))
        });
        bus.on("panics", EventPriority::High, |event: &TestEvent| {
            if event.value > 0 {
                panic!("handler exploded");
            }
            Ok(())
        });
        bus.on("survivor", EventPriority::Low, recorder(&log, "survivor"));

        assert_eq!(bus.emit(&TestEvent { value: 7 }), 1);
        assert_eq!(*log.lock(), vec!["survivor"]);

        let stats = bus.get_stats();
        assert_eq!(stats.events_emitted, 1);
        assert_eq!(stats.handler_failures, 2);
    }

    #[test]
    fn test_handlers_only_receive_their_event_type() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("test", EventPriority::Normal, recorder(&log, "test"));

        assert_eq!(bus.emit(&OtherEvent), 0);
        assert!(log.lock().is_empty());
        assert_eq!(bus.handler_count::<TestEvent>(), 1);
        assert_eq!(bus.handler_count::<OtherEvent>(), 0);
    }

    #[test]
    fn test_handler_receives_event_payload() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        bus.on("payload", EventPriority::Normal, move |event: &TestEvent| {
            *sink.lock() = Some(event.value);
            Ok(())
        });

        bus.emit(&TestEvent { value: 42 });
        assert_eq!(*seen.lock(), Some(42));
    }

    #[test]
    fn test_typed_handler_rejects_wrong_type() {
        let handler = TypedEventHandler::new("typed".to_string(), |_event: &TestEvent| Ok(()));
        assert!(matches!(
            handler.handle(&OtherEvent),
            Err(EventError::TypeMismatch(name)) if name == "typed"
        ));
        assert_eq!(handler.expected_type_id(), TypeId::of::<TestEvent>());
    }

    #[test]
    fn test_stats_count_registrations() {
        let bus = EventBus::new();
        bus.on("a", EventPriority::Normal, |_event: &TestEvent| Ok(()));
        bus.on("b", EventPriority::Normal, |_event: &OtherEvent| Ok(()));
        assert_eq!(bus.get_stats().total_handlers, 2);
    }

    struct CountingHandler {
        calls: Arc<Mutex<u32>>,
    }

    impl EventHandler for CountingHandler {
        fn handle(&self, event: &dyn Any) -> Result<(), EventError> {
            if event.downcast_ref::<TestEvent>().is_none() {
                return Err(EventError::TypeMismatch("counting".to_string()));
            }
            *self.calls.lock() += 1;
            Ok(())
        }

        fn expected_type_id(&self) -> TypeId {
            TypeId::of::<TestEvent>()
        }

        fn handler_name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_hand_written_handler_is_keyed_by_its_type() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(0));
        bus.register_handler(
            EventPriority::Low,
            Arc::new(CountingHandler {
                calls: calls.clone(),
            }),
        );

        assert_eq!(bus.handler_count::<TestEvent>(), 1);
        assert_eq!(bus.handler_count::<OtherEvent>(), 0);
        assert_eq!(bus.emit(&TestEvent { value: 1 }), 1);
        assert_eq!(bus.emit(&OtherEvent), 0);
        assert_eq!(*calls.lock(), 1);
    }
}
