use crate::codec::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdpKind {
    Offer,
    Answer,
}

impl SdpKind {
    pub fn tag(self) -> char {
        match self {
            SdpKind::Offer => 'o',
            SdpKind::Answer => 'a',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'o' => Some(SdpKind::Offer),
            'a' => Some(SdpKind::Answer),
            _ => None,
        }
    }
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => f.write_str("offer"),
            SdpKind::Answer => f.write_str("answer"),
        }
    }
}

/// One side of a handshake as produced by the peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    pub kind: SdpKind,
    pub body: String,
}

impl SessionDescriptor {
    pub fn offer(body: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            body: body.into(),
        }
    }

    pub fn answer(body: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            body: body.into(),
        }
    }

    pub fn slim(&self) -> SlimDescriptor {
        SlimDescriptor {
            kind: self.kind.tag(),
            body: self.body.clone(),
        }
    }
}

/// Two-field projection of a [`SessionDescriptor`] carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlimDescriptor {
    #[serde(rename = "t")]
    pub kind: char,
    #[serde(rename = "s")]
    pub body: String,
}

impl SlimDescriptor {
    pub fn unslim(self) -> Result<SessionDescriptor, CodecError> {
        let kind = SdpKind::from_tag(self.kind).ok_or(CodecError::UnknownKind(self.kind))?;
        Ok(SessionDescriptor {
            kind,
            body: self.body,
        })
    }
}
