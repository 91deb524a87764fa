use pastelink_peer::Phase;

use crate::integration::init_tracing;
use crate::utils::{EventRecorder, RecordedEvent, TOKEN_TIMEOUT_MS, new_peer, with_timeout};

#[tokio::test]
async fn test_offer_is_idempotent() {
    init_tracing();

    let peer = new_peer("double-offer").await.expect("Failed to create peer");
    let recorder = EventRecorder::attach(peer.events());

    let (first, second) = with_timeout(
        TOKEN_TIMEOUT_MS,
        async { tokio::join!(peer.create_offer(), peer.create_offer()) },
    )
    .await
    .expect("Offers timed out");
    let first = first.expect("First offer failed");
    let second = second.expect("Second offer should be a no-op, not an error");

    assert!(!first.is_empty());
    assert!(second.is_empty());
    assert_eq!(peer.phase(), Phase::AwaitingAnswer);
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::HaveOffer(_))),
        1
    );
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::DataChannel(_))),
        1
    );

    // Still a no-op once the offer is out.
    let third = peer.create_offer().await.expect("Third offer failed");
    assert!(third.is_empty());
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::HaveOffer(_))),
        1
    );

    peer.close().await.expect("Failed to close peer");
}
