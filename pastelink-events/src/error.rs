use std::any::Any;
use thiserror::Error;

/// A listener that failed during `invoke`. Never leaves the bus; only logged.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("listener returned an error: {0:#}")]
    Failed(#[from] anyhow::Error),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub(crate) fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = match panic.downcast::<String>() {
            Ok(message) => *message,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => "non-string panic payload".to_owned(),
            },
        };
        ListenerError::Panicked(message)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("alias '{alias}' is registered with a type other than {expected}")]
    TypeMismatch {
        alias: String,
        expected: &'static str,
    },
}
