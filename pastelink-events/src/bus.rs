use crate::error::ListenerError;
use crate::key::EventKey;
use crate::registration::{Binding, Call, Dispatch, Listener, Registration};
use crate::registry;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct EventBusOptions {
    /// Log every invocation at debug level.
    pub log: bool,
    /// Label used in log lines, and the registry key when `global` is set.
    pub alias: String,
    /// Register the bus in the process-wide registry on creation.
    pub global: bool,
}

impl Default for EventBusOptions {
    fn default() -> Self {
        Self {
            log: false,
            alias: "event-bus".to_owned(),
            global: false,
        }
    }
}

struct Tables<K, V, R> {
    events: HashMap<K, Vec<Registration<V, R>>>,
    waiters: HashMap<K, Arc<watch::Sender<bool>>>,
}

impl<K: EventKey, V, R> Tables<K, V, R> {
    fn listeners(&mut self, event: K) -> &mut Vec<Registration<V, R>> {
        self.events.entry(event).or_default()
    }

    fn append(&mut self, event: K, registrations: impl IntoIterator<Item = Registration<V, R>>) {
        let list = self.listeners(event);
        list.extend(registrations);
        list.sort_by_key(|registration| registration.priority);
    }

    /// Empties the listener list of `event`. An armed waiter stays registered:
    /// its waits end with the next invocation, not with the reset.
    fn reset(&mut self, event: &K) {
        let mut list = Vec::new();
        if let Some(waiter) = self.waiters.get(event) {
            list.push(Registration::waiter(Arc::clone(waiter)));
        }
        self.events.insert(event.clone(), list);
    }
}

/// Priority-ordered publish/subscribe registry.
///
/// Listeners run synchronously on the invoking task, lowest priority first,
/// ties in registration order. Dispatch works on a snapshot of the listener
/// list, so a listener may add or remove registrations (its own included);
/// the change applies from the next invocation. A listener must not invoke
/// the event it is currently handling.
pub struct EventBus<K, V, R = ()> {
    alias: String,
    log: bool,
    tables: Mutex<Tables<K, V, R>>,
}

impl<K, V, R> EventBus<K, V, R>
where
    K: EventKey,
    V: Clone + Send + Sync + 'static,
    R: 'static,
{
    pub fn new(options: EventBusOptions) -> Self {
        Self {
            alias: options.alias,
            log: options.log,
            tables: Mutex::new(Tables {
                events: HashMap::new(),
                waiters: HashMap::new(),
            }),
        }
    }

    /// Builds a shared bus, registering it under its alias when `global` is set.
    pub fn create(options: EventBusOptions) -> Arc<Self> {
        let global = options.global;
        let bus = Arc::new(Self::new(options));
        if global {
            registry::register(bus.alias.clone(), Arc::clone(&bus));
        }
        bus
    }

    /// The bus registered under `alias`, if it has these type parameters.
    pub fn global(alias: &str) -> Option<Arc<Self>> {
        registry::lookup::<Self>(alias)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn add(&self, event: K, registrations: impl IntoIterator<Item = Registration<V, R>>) {
        self.tables.lock().append(event, registrations);
    }

    /// Replaces every listener of `event` in one step.
    pub fn set(&self, event: K, registrations: impl IntoIterator<Item = Registration<V, R>>) {
        let mut tables = self.tables.lock();
        tables.reset(&event);
        tables.append(event, registrations);
    }

    /// Removes the first stored match of each registration. Unknown ones are ignored.
    pub fn remove(&self, event: &K, registrations: impl IntoIterator<Item = Registration<V, R>>) {
        let mut tables = self.tables.lock();
        let list = tables.listeners(event.clone());
        for registration in registrations {
            if let Some(index) = list.iter().position(|stored| stored.same(&registration)) {
                list.remove(index);
            }
        }
    }

    pub fn clear(&self, event: &K) {
        self.tables.lock().reset(event);
    }

    pub fn is_empty(&self, event: &K) -> bool {
        self.listener_count(event) == 0
    }

    pub fn listener_count(&self, event: &K) -> usize {
        self.tables.lock().listeners(event.clone()).len()
    }

    /// Subscribes a batch of `(event, registration)` pairs.
    pub fn on(&self, entries: impl IntoIterator<Item = (K, Registration<V, R>)>) {
        let mut tables = self.tables.lock();
        for (event, registration) in entries {
            tables.append(event, [registration]);
        }
    }

    pub fn off(&self, entries: impl IntoIterator<Item = (K, Registration<V, R>)>) {
        for (event, registration) in entries {
            self.remove(&event, [registration]);
        }
    }

    /// Drops every registration owned by `binding`, across all events.
    pub fn off_from_binding(&self, binding: &Binding) {
        let mut tables = self.tables.lock();
        for list in tables.events.values_mut() {
            list.retain(|registration| !registration.is_bound_to(binding));
        }
    }

    /// Calls every listener of `event` with `args` and returns what they
    /// produced, in call order. Failing listeners are logged and left out.
    pub fn invoke(&self, event: &K, args: &[V]) -> Vec<R> {
        if event.is_blank() {
            return Vec::new();
        }

        let snapshot = {
            let tables = self.tables.lock();
            match tables.events.get(event) {
                Some(list) => list.clone(),
                None => return Vec::new(),
            }
        };

        if self.log {
            debug!(
                "[{}] Invoked {:?} with {} argument(s), {} listener(s)",
                self.alias,
                event,
                args.len(),
                snapshot.len()
            );
        }

        let mut results = Vec::with_capacity(snapshot.len());
        let mut fired = Vec::new();
        for registration in &snapshot {
            match &registration.dispatch {
                Dispatch::Listener(listener) => {
                    if let Some(result) = self.dispatch(event, registration, listener, args) {
                        results.push(result);
                    }
                }
                Dispatch::Waiter(waiter) => fired.push(Arc::clone(waiter)),
            }
        }

        if !fired.is_empty() {
            self.resolve_waiters(event, fired);
        }

        results
    }

    /// Completes after the next `invoke(event)` has run all its listeners.
    ///
    /// All waits armed before that invocation share one waiter and finish
    /// together; a wait armed afterwards needs another invocation. The waiter
    /// is an ordinary registration, so it counts towards `is_empty`. It
    /// survives `clear` and `set`.
    pub fn wait(&self, event: K) -> BoxFuture<'static, ()> {
        let mut fired = {
            let mut tables = self.tables.lock();
            let waiter = match tables.waiters.get(&event) {
                Some(waiter) => Arc::clone(waiter),
                None => {
                    let (sender, _) = watch::channel(false);
                    let waiter = Arc::new(sender);
                    tables.append(event.clone(), [Registration::waiter(Arc::clone(&waiter))]);
                    tables.waiters.insert(event, Arc::clone(&waiter));
                    waiter
                }
            };
            waiter.subscribe()
        };

        async move {
            loop {
                let done = *fired.borrow_and_update();
                if done || fired.changed().await.is_err() {
                    break;
                }
            }
        }
        .boxed()
    }

    fn dispatch(
        &self,
        event: &K,
        registration: &Registration<V, R>,
        listener: &Listener<V, R>,
        args: &[V],
    ) -> Option<R> {
        let joined: Vec<V>;
        let args = if registration.extra_args.is_empty() {
            args
        } else {
            joined = args
                .iter()
                .chain(&registration.extra_args)
                .cloned()
                .collect();
            &joined
        };

        let call = Call {
            receiver: registration.binding.as_ref(),
            args,
        };

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| listener.call(call))) {
            Ok(Ok(result)) => return Some(result),
            Ok(Err(e)) => ListenerError::from(e),
            Err(panic) => ListenerError::from_panic(panic),
        };
        error!("[{}] Listener for {:?} failed: {}", self.alias, event, outcome);
        None
    }

    fn resolve_waiters(&self, event: &K, fired: Vec<Arc<watch::Sender<bool>>>) {
        {
            let mut tables = self.tables.lock();
            if let Some(list) = tables.events.get_mut(event) {
                list.retain(|registration| !fired.iter().any(|w| registration.is_waiter(w)));
            }
            let armed = tables
                .waiters
                .get(event)
                .is_some_and(|current| fired.iter().any(|w| Arc::ptr_eq(w, current)));
            if armed {
                tables.waiters.remove(event);
            }
        }

        for waiter in fired {
            waiter.send_replace(true);
        }
    }
}

impl<K, V, R> Default for EventBus<K, V, R>
where
    K: EventKey,
    V: Clone + Send + Sync + 'static,
    R: 'static,
{
    fn default() -> Self {
        Self::new(EventBusOptions::default())
    }
}
