use crate::descriptor::from_rtc;
use crate::error::ConnectionError;
use crate::manager::ManagerInner;
use std::sync::Arc;
use tracing::debug;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;

impl ManagerInner {
    /// Channel first: an offer made without one negotiates no SCTP transport.
    pub(super) async fn generate_offer(self: &Arc<Self>) -> Result<String, ConnectionError> {
        let options = &self.config.channel;
        let init = RTCDataChannelInit {
            ordered: Some(!options.unordered),
            max_retransmits: options.max_retransmits,
            max_packet_life_time: options.max_packet_life_time,
            ..Default::default()
        };
        let channel = self
            .peer_connection
            .create_data_channel(&self.config.channel_label, Some(init))
            .await?;
        self.setup_data_channel(channel);

        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection.set_local_description(offer).await?;
        debug!("Local offer committed");

        self.wait_ice_complete().await;
        self.encode_local_description().await
    }

    /// The committed local description, which includes gathered candidates.
    pub(super) async fn encode_local_description(&self) -> Result<String, ConnectionError> {
        let local = self
            .peer_connection
            .local_description()
            .await
            .ok_or(ConnectionError::MissingLocalDescription)?;
        let descriptor = from_rtc(&local)?;
        Ok(self.codec.encode(&descriptor)?)
    }
}
