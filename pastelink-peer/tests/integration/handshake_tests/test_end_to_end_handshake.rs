use pastelink_peer::{PeerEvent, Phase, Role};

use crate::integration::init_tracing;
use crate::utils::{EventRecorder, RecordedEvent, connect_pair, new_peer};

#[tokio::test]
async fn test_end_to_end_handshake() {
    init_tracing();

    let alice = new_peer("alice").await.expect("Failed to create offerer");
    let bob = new_peer("bob").await.expect("Failed to create answerer");
    let alice_events = EventRecorder::attach(alice.events());
    let bob_events = EventRecorder::attach(bob.events());

    connect_pair(&alice, &bob).await.expect("Handshake failed");

    assert_eq!(alice.role(), Role::Offerer);
    assert_eq!(bob.role(), Role::Answerer);
    assert_eq!(alice.phase(), Phase::Connected);
    assert_eq!(bob.phase(), Phase::Connected);

    let is_connected = |e: &RecordedEvent| matches!(e, RecordedEvent::Connected);
    assert_eq!(alice_events.count(is_connected), 1);
    assert_eq!(bob_events.count(is_connected), 1);

    // Offerer announces its own channel before the offer token exists.
    let alice_log = alice_events.events();
    let channel_at = alice_log
        .iter()
        .position(|e| matches!(e, RecordedEvent::DataChannel(_)))
        .expect("offerer should announce its data channel");
    let offer_at = alice_log
        .iter()
        .position(|e| matches!(e, RecordedEvent::HaveOffer(_)))
        .expect("offerer should publish its offer");
    assert!(channel_at < offer_at);

    assert_eq!(
        bob_events.count(|e| matches!(e, RecordedEvent::HaveAnswer(_))),
        1
    );
    assert_eq!(
        bob_events.count(|e| *e == RecordedEvent::DataChannel("data".to_owned())),
        1
    );

    // Already open: nothing new is left registered on the bus.
    let registered = bob.events().listener_count(&PeerEvent::ChannelOpen);
    bob.wait_open().await.expect("open channel should not wait");
    assert_eq!(
        bob.events().listener_count(&PeerEvent::ChannelOpen),
        registered
    );

    alice.close().await.expect("Failed to close offerer");
    bob.close().await.expect("Failed to close answerer");
}
