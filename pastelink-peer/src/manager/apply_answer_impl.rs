use crate::descriptor::into_rtc;
use crate::error::ConnectionError;
use crate::manager::ManagerInner;
use pastelink_core::SessionDescriptor;

impl ManagerInner {
    pub(super) async fn accept_answer(&self, answer: SessionDescriptor) -> Result<(), ConnectionError> {
        self.peer_connection
            .set_remote_description(into_rtc(answer)?)
            .await?;
        Ok(())
    }
}
