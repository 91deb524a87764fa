pub mod event_recorder;
pub mod handshake;

pub use event_recorder::*;
pub use handshake::*;
