//! Process-wide alias table, so independently built components can reach the
//! same shared instance (typically an event bus) without passing it around.

use crate::error::RegistryError;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::{Any, type_name};
use std::sync::Arc;
use tracing::{debug, warn};

type Entry = Arc<dyn Any + Send + Sync>;

static REGISTRY: Lazy<DashMap<String, Entry>> = Lazy::new(DashMap::new);

/// Binds `value` to `alias`, replacing any previous binding.
pub fn register<T: Any + Send + Sync>(alias: impl Into<String>, value: Arc<T>) {
    let alias = alias.into();
    debug!("Registering {} as '{}'", type_name::<T>(), alias);
    if REGISTRY.insert(alias.clone(), value).is_some() {
        warn!("Registry alias '{}' was already bound; replaced", alias);
    }
}

/// `None` when nothing is bound to `alias` or it is bound to another type.
pub fn lookup<T: Any + Send + Sync>(alias: &str) -> Option<Arc<T>> {
    let entry = Arc::clone(REGISTRY.get(alias)?.value());
    entry.downcast::<T>().ok()
}

/// Returns the instance bound to `alias`, binding `init()` first if the alias
/// is free. `init` runs under the registry's shard lock and must not touch
/// the registry itself.
pub fn get_or_register<T, F>(alias: &str, init: F) -> Result<Arc<T>, RegistryError>
where
    T: Any + Send + Sync,
    F: FnOnce() -> Arc<T>,
{
    let entry = Arc::clone(
        REGISTRY
            .entry(alias.to_owned())
            .or_insert_with(|| {
                let value: Entry = init();
                value
            })
            .value(),
    );

    entry
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            alias: alias.to_owned(),
            expected: type_name::<T>(),
        })
}

pub fn unregister(alias: &str) -> bool {
    REGISTRY.remove(alias).is_some()
}
