use pastelink_core::{ChannelOptions, PeerConfig};
use pastelink_peer::{ConnectionError, ConnectionManager, Phase, Role};

use crate::integration::init_tracing;
use crate::utils::{EventRecorder, RecordedEvent};

#[tokio::test]
async fn test_failed_offer_rolls_back() {
    init_tracing();

    // A channel cannot bound both retransmissions and lifetime.
    let config = PeerConfig {
        channel: ChannelOptions {
            max_retransmits: Some(2),
            max_packet_life_time: Some(500),
            ..ChannelOptions::default()
        },
        bus_alias: "failed-offer".to_owned(),
        ..PeerConfig::local()
    };
    let peer = ConnectionManager::new(config)
        .await
        .expect("Failed to create peer");
    let recorder = EventRecorder::attach(peer.events());

    for attempt in 0..2 {
        let err = peer
            .create_offer()
            .await
            .expect_err("conflicting channel options must fail the offer");
        assert!(
            matches!(err, ConnectionError::Rtc(_)),
            "attempt {attempt}: unexpected error {err}"
        );

        // Back to idle, so the next attempt runs instead of being ignored.
        assert_eq!(peer.phase(), Phase::Idle);
        assert_eq!(peer.role(), Role::Undetermined);
        assert!(peer.channel().is_none());
    }
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::HaveOffer(_))),
        0
    );

    peer.close().await.expect("Failed to close peer");
}
