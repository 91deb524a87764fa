use pastelink_core::Payload;
use pastelink_events::{EventBus, EventKey};
use std::fmt;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Milestones a [`ConnectionManager`](crate::ConnectionManager) publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerEvent {
    /// Local offer is ready: `[Token]`.
    HaveOffer,
    /// Local answer is ready: `[Token]`.
    HaveAnswer,
    /// Handshake finished on this side. No arguments.
    Connected,
    /// A data channel was created locally or announced by the remote: `[Channel]`.
    DataChannel,
    /// The data channel can be written to. No arguments.
    ChannelOpen,
    /// One inbound transport message: `[Message]`.
    Message,
    /// The peer connection failed or was closed: `[State]`.
    Disconnected,
    /// Raw ICE gathering progress from the peer connection: `[Gathering]`.
    IceGatheringStateChange,
}

impl EventKey for PeerEvent {}

impl fmt::Display for PeerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerEvent::HaveOffer => "on_have_offer",
            PeerEvent::HaveAnswer => "on_have_answer",
            PeerEvent::Connected => "on_connected",
            PeerEvent::DataChannel => "on_data_channel",
            PeerEvent::ChannelOpen => "on_channel_open",
            PeerEvent::Message => "on_message",
            PeerEvent::Disconnected => "on_disconnected",
            PeerEvent::IceGatheringStateChange => "on_ice_gathering_state_change",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub enum PeerSignal {
    Token(String),
    Channel(Arc<RTCDataChannel>),
    Message(Payload),
    Gathering(RTCIceGathererState),
    State(RTCPeerConnectionState),
}

impl PeerSignal {
    pub fn as_token(&self) -> Option<&str> {
        match self {
            PeerSignal::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            PeerSignal::Message(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Arc<RTCDataChannel>> {
        match self {
            PeerSignal::Channel(channel) => Some(channel),
            _ => None,
        }
    }
}

impl fmt::Debug for PeerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerSignal::Token(token) => f.debug_tuple("Token").field(&token.len()).finish(),
            PeerSignal::Channel(channel) => f.debug_tuple("Channel").field(&channel.label()).finish(),
            PeerSignal::Message(payload) => f.debug_tuple("Message").field(payload).finish(),
            PeerSignal::Gathering(state) => f.debug_tuple("Gathering").field(state).finish(),
            PeerSignal::State(state) => f.debug_tuple("State").field(state).finish(),
        }
    }
}

pub type PeerBus = EventBus<PeerEvent, PeerSignal>;

/// What the manager waits on itself. Kept off the public bus, where a
/// consumer's `clear` or `set` could unhook it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum InternalEvent {
    IceGatheringComplete,
}

impl EventKey for InternalEvent {}

pub(crate) type InternalBus = EventBus<InternalEvent, ()>;
