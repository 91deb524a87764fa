use crate::descriptor::expect_kind;
use crate::error::ConnectionError;
use crate::event::{InternalBus, PeerBus, PeerEvent, PeerSignal};
use pastelink_core::{Payload, PeerConfig, SdpKind, SignalingCodec};
use pastelink_events::EventBusOptions;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::peer_connection::RTCPeerConnection;

mod apply_answer_impl;
mod apply_offer_impl;
mod create_offer_impl;
mod create_pc_impl;
mod ice_wait_impl;
mod setup_data_channel_impl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Undetermined,
    Offerer,
    Answerer,
}

/// Position in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Offer being generated; further offers are no-ops.
    Offering,
    AwaitingAnswer,
    /// Remote answer being applied.
    Accepting,
    /// Remote offer being applied and the answer generated.
    Answering,
    /// Answer handed out, waiting for the offerer's data channel.
    AwaitingChannel,
    Connected,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Offering => "generating an offer",
            Phase::AwaitingAnswer => "awaiting an answer",
            Phase::Accepting => "applying an answer",
            Phase::Answering => "generating an answer",
            Phase::AwaitingChannel => "awaiting the data channel",
            Phase::Connected => "connected",
            Phase::Closed => "closed",
        };
        f.write_str(name)
    }
}

struct ManagerState {
    role: Role,
    phase: Phase,
    channel: Option<Arc<RTCDataChannel>>,
}

pub(crate) struct ManagerInner {
    config: PeerConfig,
    codec: SignalingCodec,
    bus: Arc<PeerBus>,
    internal: InternalBus,
    peer_connection: Arc<RTCPeerConnection>,
    state: Mutex<ManagerState>,
}

impl ManagerInner {
    /// Moves `from -> to` atomically. `false` (and no change) if the phase is not `from`.
    fn advance(&self, from: Phase, to: Phase) -> bool {
        let mut state = self.state.lock();
        if state.phase != from {
            return false;
        }
        state.phase = to;
        true
    }

    fn begin(
        &self,
        operation: &'static str,
        from: Phase,
        to: Phase,
        role: Role,
    ) -> Result<(), ConnectionError> {
        let mut state = self.state.lock();
        if state.phase != from {
            return Err(ConnectionError::State {
                operation,
                phase: state.phase,
            });
        }
        state.phase = to;
        state.role = role;
        Ok(())
    }

    /// Undo a failed `begin`, unless teardown happened meanwhile.
    fn roll_back(&self, from: Phase, to: Phase, role: Role) {
        let mut state = self.state.lock();
        if state.phase == from {
            state.phase = to;
            state.role = role;
        }
    }

    fn emit(&self, event: PeerEvent, args: &[PeerSignal]) {
        debug!("Emitting {}", event);
        self.bus.invoke(&event, args);
    }
}

/// Owns one peer connection and drives its offer/answer handshake.
///
/// Results come back both as return values and as [`PeerEvent`]s on the
/// manager's bus. Tokens are the only thing meant to leave the process.
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

impl ConnectionManager {
    /// Creates the peer connection with a private event bus.
    pub async fn new(config: PeerConfig) -> Result<Self, ConnectionError> {
        let bus = PeerBus::create(EventBusOptions {
            log: false,
            alias: config.bus_alias.clone(),
            global: false,
        });
        Self::with_bus(config, bus).await
    }

    /// Creates the peer connection publishing onto an existing bus.
    pub async fn with_bus(config: PeerConfig, bus: Arc<PeerBus>) -> Result<Self, ConnectionError> {
        let peer_connection = ManagerInner::create_pc(&config).await?;
        let codec = SignalingCodec::new(config.compress_tokens);
        let internal = InternalBus::new(EventBusOptions {
            log: false,
            alias: format!("{}/internal", config.bus_alias),
            global: false,
        });

        let inner = Arc::new(ManagerInner {
            config,
            codec,
            bus,
            internal,
            peer_connection,
            state: Mutex::new(ManagerState {
                role: Role::Undetermined,
                phase: Phase::Idle,
                channel: None,
            }),
        });
        ManagerInner::install_handlers(&inner);

        info!("Peer connection ready ({})", inner.bus.alias());
        Ok(Self { inner })
    }

    pub fn events(&self) -> &Arc<PeerBus> {
        &self.inner.bus
    }

    pub fn role(&self) -> Role {
        self.inner.state.lock().role
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub fn channel(&self) -> Option<Arc<RTCDataChannel>> {
        self.inner.state.lock().channel.clone()
    }

    pub fn is_open(&self) -> bool {
        self.inner.open_channel().is_some()
    }

    /// Generates the local offer and returns its token, also published as
    /// [`PeerEvent::HaveOffer`]. Returns an empty token without doing
    /// anything unless the manager is idle.
    pub async fn create_offer(&self) -> Result<String, ConnectionError> {
        if let Err(rejected) = self
            .inner
            .begin("create an offer", Phase::Idle, Phase::Offering, Role::Offerer)
        {
            warn!("Ignoring offer request: {}", rejected);
            return Ok(String::new());
        }

        match self.inner.generate_offer().await {
            Ok(token) => {
                self.inner.advance(Phase::Offering, Phase::AwaitingAnswer);
                info!("Offer ready ({} chars)", token.len());
                self.inner
                    .emit(PeerEvent::HaveOffer, &[PeerSignal::Token(token.clone())]);
                Ok(token)
            }
            Err(e) => {
                warn!("Offer generation failed: {}", e);
                self.inner.discard_channel().await;
                self.inner
                    .roll_back(Phase::Offering, Phase::Idle, Role::Undetermined);
                Err(e)
            }
        }
    }

    /// Applies the remote offer and returns the answer token, also published
    /// as [`PeerEvent::HaveAnswer`]. A malformed token leaves the manager idle.
    pub async fn apply_offer(&self, token: &str) -> Result<String, ConnectionError> {
        let descriptor = self.inner.codec.decode(token)?;
        expect_kind(&descriptor, SdpKind::Offer)?;
        self.inner
            .begin("apply an offer", Phase::Idle, Phase::Answering, Role::Answerer)?;

        match self.inner.generate_answer(descriptor).await {
            Ok(token) => {
                self.inner.advance(Phase::Answering, Phase::AwaitingChannel);
                info!("Answer ready ({} chars)", token.len());
                self.inner
                    .emit(PeerEvent::HaveAnswer, &[PeerSignal::Token(token.clone())]);
                Ok(token)
            }
            Err(e) => {
                warn!("Answer generation failed: {}", e);
                self.inner
                    .roll_back(Phase::Answering, Phase::Idle, Role::Undetermined);
                Err(e)
            }
        }
    }

    /// Applies the remote answer to our outstanding offer.
    pub async fn apply_answer(&self, token: &str) -> Result<(), ConnectionError> {
        let descriptor = self.inner.codec.decode(token)?;
        expect_kind(&descriptor, SdpKind::Answer)?;
        self.inner.begin(
            "apply an answer",
            Phase::AwaitingAnswer,
            Phase::Accepting,
            Role::Offerer,
        )?;

        match self.inner.accept_answer(descriptor).await {
            Ok(()) => {
                self.inner.advance(Phase::Accepting, Phase::Connected);
                info!("Answer applied, handshake complete");
                self.inner.emit(PeerEvent::Connected, &[]);
                Ok(())
            }
            Err(e) => {
                warn!("Applying answer failed: {}", e);
                self.inner
                    .roll_back(Phase::Accepting, Phase::AwaitingAnswer, Role::Offerer);
                Err(e)
            }
        }
    }

    pub async fn send(&self, payload: impl Into<Payload>) -> Result<(), ConnectionError> {
        let channel = self
            .inner
            .open_channel()
            .ok_or(ConnectionError::ChannelClosed)?;

        match payload.into() {
            Payload::Text(text) => channel.send_text(text).await?,
            Payload::Binary(data) => channel.send(&data).await?,
        };
        Ok(())
    }

    /// Completes once the data channel is writable.
    pub async fn wait_open(&self) -> Result<(), ConnectionError> {
        if self.is_open() {
            return Ok(());
        }
        if self.phase() == Phase::Closed {
            return Err(ConnectionError::ChannelClosed);
        }

        // Arm first, then look again: an open landing in between still counts.
        let opened = self.inner.bus.wait(PeerEvent::ChannelOpen);
        if self.is_open() {
            return Ok(());
        }
        opened.await;
        Ok(())
    }

    /// Releases the data channel and the peer connection. Later sends fail.
    pub async fn close(&self) -> Result<(), ConnectionError> {
        let channel = {
            let mut state = self.inner.state.lock();
            if state.phase == Phase::Closed {
                return Ok(());
            }
            state.phase = Phase::Closed;
            state.channel.take()
        };

        if let Some(channel) = channel {
            if let Err(e) = channel.close().await {
                warn!("Failed to close data channel: {}", e);
            }
        }
        self.inner.peer_connection.close().await?;
        info!("Peer connection closed");
        Ok(())
    }
}

impl ManagerInner {
    fn open_channel(&self) -> Option<Arc<RTCDataChannel>> {
        let state = self.state.lock();
        if state.phase == Phase::Closed {
            return None;
        }
        state
            .channel
            .as_ref()
            .filter(|channel| channel.ready_state() == RTCDataChannelState::Open)
            .cloned()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.phase() == Phase::Closed {
            return;
        }
        // No async drop: hand the teardown to the runtime if there is one.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("Dropping peer connection outside a runtime");
            return;
        };
        let peer_connection = Arc::clone(&self.inner.peer_connection);
        runtime.spawn(async move {
            if let Err(e) = peer_connection.close().await {
                warn!("Failed to close dropped peer connection: {}", e);
            }
        });
    }
}
