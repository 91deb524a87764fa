mod descriptor;
mod error;
mod event;
mod manager;

pub use error::ConnectionError;
pub use event::{PeerBus, PeerEvent, PeerSignal};
pub use manager::{ConnectionManager, Phase, Role};
