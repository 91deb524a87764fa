use thiserror::Error;

/// Why a signaling token could not be produced or read back.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid url-safe base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unknown token format tag {0:#04x}")]
    UnknownFormat(u8),

    #[error("compressed stream is corrupt: {0}")]
    Compression(#[from] std::io::Error),

    #[error("descriptor inflates past {0} bytes")]
    TooLarge(usize),

    #[error("descriptor is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("descriptor is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown descriptor kind '{0}'")]
    UnknownKind(char),
}
