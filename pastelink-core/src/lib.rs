pub mod codec;
pub mod model;

pub use codec::{CodecError, SignalingCodec};
pub use model::*;
