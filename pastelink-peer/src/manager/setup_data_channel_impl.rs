use crate::event::{PeerEvent, PeerSignal};
use crate::manager::{ManagerInner, Phase};
use pastelink_core::Payload;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;

impl ManagerInner {
    /// Attaches the open/message/close handlers, stores the handle and
    /// announces it as [`PeerEvent::DataChannel`].
    pub(super) fn setup_data_channel(self: &Arc<Self>, channel: Arc<RTCDataChannel>) {
        debug!("Setting up data channel '{}'", channel.label());

        let weak = Arc::downgrade(self);
        let label = channel.label().to_owned();
        channel.on_open(Box::new(move || {
            let weak = weak.clone();
            let label = label.clone();
            Box::pin(async move {
                info!("Data channel '{}' open", label);
                let Some(inner) = weak.upgrade() else { return };
                inner.emit(PeerEvent::ChannelOpen, &[]);
            })
        }));

        let weak = Arc::downgrade(self);
        channel.on_message(Box::new(move |msg: DataChannelMessage| {
            let weak = weak.clone();
            Box::pin(async move {
                let Some(inner) = weak.upgrade() else { return };
                let payload = if msg.is_string {
                    Payload::Text(String::from_utf8_lossy(&msg.data).into_owned())
                } else {
                    Payload::Binary(msg.data)
                };
                debug!("Message received: {} bytes", payload.len());
                inner.emit(PeerEvent::Message, &[PeerSignal::Message(payload)]);
            })
        }));

        let label = channel.label().to_owned();
        channel.on_close(Box::new(move || {
            let label = label.clone();
            Box::pin(async move {
                debug!("Data channel '{}' closed", label);
            })
        }));

        self.state.lock().channel = Some(Arc::clone(&channel));
        self.emit(PeerEvent::DataChannel, &[PeerSignal::Channel(channel)]);
    }

    /// Answering side: the offerer's channel arrived, which completes the handshake here.
    pub(super) fn adopt_remote_channel(self: &Arc<Self>, channel: Arc<RTCDataChannel>) {
        {
            let state = self.state.lock();
            match state.phase {
                Phase::Answering | Phase::AwaitingChannel => {}
                phase => {
                    warn!(
                        "Ignoring data channel '{}' announced while {}",
                        channel.label(),
                        phase
                    );
                    return;
                }
            }
        }

        self.setup_data_channel(channel);
        if self.advance(Phase::AwaitingChannel, Phase::Connected)
            || self.advance(Phase::Answering, Phase::Connected)
        {
            info!("Remote data channel received, handshake complete");
            self.emit(PeerEvent::Connected, &[]);
        }
    }

    /// Drops a channel made by a failed offer attempt.
    pub(super) async fn discard_channel(&self) {
        let channel = self.state.lock().channel.take();
        let Some(channel) = channel else { return };
        if let Err(e) = channel.close().await {
            warn!("Failed to close discarded data channel: {}", e);
        }
    }
}
