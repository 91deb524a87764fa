use std::fmt::Debug;
use std::hash::Hash;

/// Anything an [`EventBus`](crate::EventBus) can be keyed by.
pub trait EventKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {
    /// Blank keys are never dispatched.
    fn is_blank(&self) -> bool {
        false
    }
}

impl EventKey for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl EventKey for &'static str {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}
