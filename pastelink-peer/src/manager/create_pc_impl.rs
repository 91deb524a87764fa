use crate::error::ConnectionError;
use crate::event::{InternalEvent, PeerEvent, PeerSignal};
use crate::manager::ManagerInner;
use pastelink_core::PeerConfig;
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_gatherer_state::RTCIceGathererState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

impl ManagerInner {
    pub(super) async fn create_pc(
        config: &PeerConfig,
    ) -> Result<Arc<RTCPeerConnection>, ConnectionError> {
        // Codecs are registered even though only a data channel is negotiated.
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = config
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        Ok(Arc::new(api.new_peer_connection(rtc_config).await?))
    }

    /// Wires the peer connection's callbacks to the bus. Callbacks hold a weak
    /// reference: the peer connection must not keep its manager alive.
    pub(super) fn install_handlers(inner: &Arc<Self>) {
        let pc = &inner.peer_connection;

        let weak = Arc::downgrade(inner);
        pc.on_ice_gathering_state_change(Box::new(move |s: RTCIceGathererState| {
            let weak = weak.clone();
            Box::pin(async move {
                debug!("ICE gathering state: {:?}", s);
                let Some(inner) = weak.upgrade() else { return };
                inner.emit(
                    PeerEvent::IceGatheringStateChange,
                    &[PeerSignal::Gathering(s)],
                );
                if s == RTCIceGathererState::Complete {
                    inner
                        .internal
                        .invoke(&InternalEvent::IceGatheringComplete, &[]);
                }
            })
        }));

        let weak = Arc::downgrade(inner);
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let weak = weak.clone();
            Box::pin(async move {
                info!("Peer connection state changed: {:?}", s);
                match s {
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let Some(inner) = weak.upgrade() else { return };
                        inner.emit(PeerEvent::Disconnected, &[PeerSignal::State(s)]);
                    }
                    _ => {}
                }
            })
        }));

        // Only the answering side is announced channels.
        let weak = Arc::downgrade(inner);
        pc.on_data_channel(Box::new(move |channel: Arc<RTCDataChannel>| {
            let weak = weak.clone();
            Box::pin(async move {
                let Some(inner) = weak.upgrade() else { return };
                inner.adopt_remote_channel(channel);
            })
        }));
    }
}
