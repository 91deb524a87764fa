mod bus;
mod error;
mod key;
mod registration;
pub mod registry;

pub use bus::{EventBus, EventBusOptions};
pub use error::{ListenerError, RegistryError};
pub use key::EventKey;
pub use registration::{Binding, Call, Listener, Registration};
