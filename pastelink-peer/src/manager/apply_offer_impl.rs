use crate::descriptor::into_rtc;
use crate::error::ConnectionError;
use crate::manager::ManagerInner;
use pastelink_core::SessionDescriptor;
use tracing::debug;

impl ManagerInner {
    pub(super) async fn generate_answer(
        &self,
        offer: SessionDescriptor,
    ) -> Result<String, ConnectionError> {
        self.peer_connection
            .set_remote_description(into_rtc(offer)?)
            .await?;
        debug!("Remote offer applied");

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection.set_local_description(answer).await?;
        debug!("Local answer committed");

        self.wait_ice_complete().await;
        self.encode_local_description().await
    }
}
