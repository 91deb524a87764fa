use crate::event::InternalEvent;
use crate::manager::ManagerInner;
use tracing::debug;
use webrtc::ice_transport::ice_gathering_state::RTCIceGatheringState;

impl ManagerInner {
    /// Returns once ICE gathering is complete, so the local description
    /// carries every candidate. No timeout.
    ///
    /// Arms the wait before the second state check: a completion landing
    /// between the two still resolves it.
    pub(super) async fn wait_ice_complete(&self) {
        if self.gathering_complete() {
            return;
        }

        let complete = self.internal.wait(InternalEvent::IceGatheringComplete);
        if !self.gathering_complete() {
            debug!("Waiting for ICE gathering to complete");
            complete.await;
        }
        debug!("ICE gathering complete");
    }

    fn gathering_complete(&self) -> bool {
        self.peer_connection.ice_gathering_state() == RTCIceGatheringState::Complete
    }
}
