use crate::error::ConnectionError;
use pastelink_core::{SdpKind, SessionDescriptor};
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

pub(crate) fn from_rtc(desc: &RTCSessionDescription) -> Result<SessionDescriptor, ConnectionError> {
    match desc.sdp_type {
        RTCSdpType::Offer => Ok(SessionDescriptor::offer(desc.sdp.clone())),
        RTCSdpType::Answer => Ok(SessionDescriptor::answer(desc.sdp.clone())),
        other => Err(ConnectionError::Unsupported(format!("{other:?}"))),
    }
}

pub(crate) fn into_rtc(descriptor: SessionDescriptor) -> Result<RTCSessionDescription, ConnectionError> {
    let desc = match descriptor.kind {
        SdpKind::Offer => RTCSessionDescription::offer(descriptor.body)?,
        SdpKind::Answer => RTCSessionDescription::answer(descriptor.body)?,
    };
    Ok(desc)
}

pub(crate) fn expect_kind(
    descriptor: &SessionDescriptor,
    expected: SdpKind,
) -> Result<(), ConnectionError> {
    if descriptor.kind == expected {
        return Ok(());
    }
    Err(ConnectionError::UnexpectedKind {
        expected,
        actual: descriptor.kind,
    })
}
