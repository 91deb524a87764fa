use crate::model::signaling::IceServerConfig;
use serde::{Deserialize, Serialize};

/// Delivery guarantees of the data channel opened by the offering side.
/// The default is reliable and ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOptions {
    pub unordered: bool,
    /// Drop a message after this many retransmissions.
    pub max_retransmits: Option<u16>,
    /// Drop a message after this many milliseconds. Exclusive with `max_retransmits`.
    pub max_packet_life_time: Option<u16>,
}

/// Settings for one peer connection and the tokens it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Label of the data channel created by the offering side.
    pub channel_label: String,
    pub channel: ChannelOptions,
    /// Deflate the descriptor before encoding it into a token.
    pub compress_tokens: bool,
    /// Label used by the peer's event bus in log lines and as its registry alias.
    pub bus_alias: String,
}

impl PeerConfig {
    /// No ICE servers: host candidates only. Enough for loopback and LAN peers.
    pub fn local() -> Self {
        Self {
            ice_servers: Vec::new(),
            ..Self::default()
        }
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::new("stun:stun.l.google.com:19302")],
            channel_label: "data".to_owned(),
            channel: ChannelOptions::default(),
            compress_tokens: true,
            bus_alias: "pastelink".to_owned(),
        }
    }
}
