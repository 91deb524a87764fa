mod config;
mod descriptor;
mod payload;
mod signaling;

pub use config::{ChannelOptions, PeerConfig};
pub use descriptor::{SdpKind, SessionDescriptor, SlimDescriptor};
pub use payload::Payload;
pub use signaling::IceServerConfig;
