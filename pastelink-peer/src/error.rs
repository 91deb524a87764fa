use crate::manager::Phase;
use pastelink_core::{CodecError, SdpKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("signaling token: {0}")]
    Decode(#[from] CodecError),

    #[error("cannot {operation} while the connection is {phase}")]
    State {
        operation: &'static str,
        phase: Phase,
    },

    #[error("expected an {expected} token, got an {actual} token")]
    UnexpectedKind { expected: SdpKind, actual: SdpKind },

    #[error("unsupported session description type {0}")]
    Unsupported(String),

    #[error("peer connection rejected the operation: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("data channel is not open")]
    ChannelClosed,

    #[error("peer connection has no local description")]
    MissingLocalDescription,
}

impl ConnectionError {
    pub fn is_decode(&self) -> bool {
        matches!(self, ConnectionError::Decode(_))
    }
}
