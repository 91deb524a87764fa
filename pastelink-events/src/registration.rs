use std::any::Any;
use std::sync::Arc;
use tokio::sync::watch;

type ListenerFn<V, R> = dyn Fn(Call<'_, V>) -> anyhow::Result<R> + Send + Sync;

/// A callback stored in the bus. Clones share identity, so the clone you kept
/// after `add` is what you hand back to `remove`.
pub struct Listener<V, R = ()>(Arc<ListenerFn<V, R>>);

impl<V, R> Listener<V, R> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Call<'_, V>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, call: Call<'_, V>) -> anyhow::Result<R> {
        (self.0)(call)
    }
}

impl<V, R> Clone for Listener<V, R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Owner context of a registration, handed to the callback as its receiver.
#[derive(Clone)]
pub struct Binding(Arc<dyn Any + Send + Sync>);

impl Binding {
    pub fn new<T: Any + Send + Sync>(owner: Arc<T>) -> Self {
        Self(owner)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Binding {
    fn from(owner: Arc<T>) -> Self {
        Self::new(owner)
    }
}

/// What a listener sees when it is invoked: the call-site arguments followed
/// by its own extra arguments, and its binding if it has one.
pub struct Call<'a, V> {
    pub(crate) receiver: Option<&'a Binding>,
    pub(crate) args: &'a [V],
}

impl<'a, V> Call<'a, V> {
    pub fn args(&self) -> &'a [V] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a V> {
        self.args.get(index)
    }

    pub fn binding(&self) -> Option<&'a Binding> {
        self.receiver
    }

    pub fn receiver<T: Any>(&self) -> Option<&'a T> {
        self.receiver.and_then(|binding| binding.downcast_ref::<T>())
    }
}

pub(crate) enum Dispatch<V, R> {
    Listener(Listener<V, R>),
    Waiter(Arc<watch::Sender<bool>>),
}

impl<V, R> Clone for Dispatch<V, R> {
    fn clone(&self) -> Self {
        match self {
            Dispatch::Listener(listener) => Dispatch::Listener(listener.clone()),
            Dispatch::Waiter(waiter) => Dispatch::Waiter(Arc::clone(waiter)),
        }
    }
}

pub struct Registration<V, R = ()> {
    pub(crate) dispatch: Dispatch<V, R>,
    pub(crate) binding: Option<Binding>,
    pub(crate) priority: i32,
    pub(crate) extra_args: Vec<V>,
}

impl<V, R> Registration<V, R> {
    pub fn new(listener: Listener<V, R>) -> Self {
        Self {
            dispatch: Dispatch::Listener(listener),
            binding: None,
            priority: 0,
            extra_args: Vec::new(),
        }
    }

    pub(crate) fn waiter(waiter: Arc<watch::Sender<bool>>) -> Self {
        Self {
            dispatch: Dispatch::Waiter(waiter),
            binding: None,
            priority: 0,
            extra_args: Vec::new(),
        }
    }

    pub fn bound(mut self, binding: impl Into<Binding>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Lower runs first. Defaults to 0.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn extra_args(mut self, extra_args: impl IntoIterator<Item = V>) -> Self {
        self.extra_args = extra_args.into_iter().collect();
        self
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Identity is `(callback, binding)`; priority and extra arguments are ignored.
    pub fn same(&self, other: &Self) -> bool {
        let same_dispatch = match (&self.dispatch, &other.dispatch) {
            (Dispatch::Listener(a), Dispatch::Listener(b)) => a.same(b),
            (Dispatch::Waiter(a), Dispatch::Waiter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        let same_binding = match (&self.binding, &other.binding) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        };
        same_dispatch && same_binding
    }

    pub(crate) fn is_bound_to(&self, binding: &Binding) -> bool {
        self.binding.as_ref().is_some_and(|own| own.same(binding))
    }

    pub(crate) fn is_waiter(&self, waiter: &Arc<watch::Sender<bool>>) -> bool {
        matches!(&self.dispatch, Dispatch::Waiter(own) if Arc::ptr_eq(own, waiter))
    }
}

impl<V: Clone, R> Clone for Registration<V, R> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            binding: self.binding.clone(),
            priority: self.priority,
            extra_args: self.extra_args.clone(),
        }
    }
}

impl<V, R> From<Listener<V, R>> for Registration<V, R> {
    fn from(listener: Listener<V, R>) -> Self {
        Self::new(listener)
    }
}
