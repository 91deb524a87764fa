//! Signaling tokens: the text a user copies from one peer to the other.
//!
//! A token is `base64url(tag || payload)` without padding, where `payload` is
//! the JSON of a [`SlimDescriptor`] and `tag` says whether it was deflated.
//! Carrying the tag lets a codec that does not compress read tokens from one
//! that does, and the other way round.

mod error;

pub use error::CodecError;

use crate::model::{SessionDescriptor, SlimDescriptor};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};
use tracing::debug;

/// Emits no padding, accepts tokens with or without it.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const FORMAT_RAW: u8 = 0x00;
const FORMAT_DEFLATE: u8 = 0x01;

/// Upper bound on an inflated descriptor. Real ones, candidates included,
/// stay far below it.
pub const MAX_DESCRIPTOR_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct SignalingCodec {
    compress: bool,
}

impl Default for SignalingCodec {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl SignalingCodec {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    /// Codec that stores the descriptor JSON as is.
    pub fn raw() -> Self {
        Self::new(false)
    }

    pub fn compresses(&self) -> bool {
        self.compress
    }

    pub fn encode(&self, descriptor: &SessionDescriptor) -> Result<String, CodecError> {
        let json = serde_json::to_vec(&descriptor.slim())?;

        let mut frame = Vec::with_capacity(json.len() + 1);
        if self.compress {
            frame.push(FORMAT_DEFLATE);
            let mut encoder = DeflateEncoder::new(frame, Compression::best());
            encoder.write_all(&json)?;
            frame = encoder.finish()?;
        } else {
            frame.push(FORMAT_RAW);
            frame.extend_from_slice(&json);
        }

        let token = TOKEN_ENGINE.encode(&frame);
        debug!(
            "Encoded {} descriptor: {} bytes of json -> {} chars",
            descriptor.kind,
            json.len(),
            token.len()
        );
        Ok(token)
    }

    /// Reads tokens in either format regardless of how this codec encodes.
    pub fn decode(&self, token: &str) -> Result<SessionDescriptor, CodecError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CodecError::Empty);
        }

        let frame = TOKEN_ENGINE.decode(token)?;
        let (&tag, body) = frame.split_first().ok_or(CodecError::Empty)?;

        let json = match tag {
            FORMAT_RAW => body.to_vec(),
            FORMAT_DEFLATE => {
                let mut inflated = Vec::new();
                DeflateDecoder::new(body)
                    .take(MAX_DESCRIPTOR_BYTES as u64 + 1)
                    .read_to_end(&mut inflated)?;
                if inflated.len() > MAX_DESCRIPTOR_BYTES {
                    return Err(CodecError::TooLarge(MAX_DESCRIPTOR_BYTES));
                }
                inflated
            }
            other => return Err(CodecError::UnknownFormat(other)),
        };

        let json = String::from_utf8(json)?;
        let slim: SlimDescriptor = serde_json::from_str(&json)?;
        slim.unslim()
    }
}
