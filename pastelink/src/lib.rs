pub use pastelink_core::{Payload, PeerConfig, SessionDescriptor, SignalingCodec};

pub mod model {
    pub use pastelink_core::model::*;
}

pub mod codec {
    pub use pastelink_core::codec::*;
}

pub mod events {
    pub use pastelink_events::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use pastelink_peer::*;
}
