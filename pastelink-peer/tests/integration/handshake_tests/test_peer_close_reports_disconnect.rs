use crate::integration::init_tracing;
use crate::utils::{DISCONNECT_TIMEOUT_MS, EventRecorder, RecordedEvent, connect_pair, new_peer};

#[tokio::test]
async fn test_peer_close_reports_disconnect() {
    init_tracing();

    let alice = new_peer("alice-leaves").await.expect("Failed to create offerer");
    let bob = new_peer("bob-stays").await.expect("Failed to create answerer");
    let bob_events = EventRecorder::attach(bob.events());

    connect_pair(&alice, &bob).await.expect("Handshake failed");
    assert_eq!(
        bob_events.count(|e| matches!(e, RecordedEvent::Disconnected)),
        0
    );

    alice.close().await.expect("Failed to close offerer");

    let noticed = bob_events
        .wait_for(
            1,
            |e| matches!(e, RecordedEvent::Disconnected),
            DISCONNECT_TIMEOUT_MS,
        )
        .await;
    assert!(noticed, "Expected the remaining peer to report the disconnect");

    bob.close().await.expect("Failed to close answerer");
}
