use pastelink_core::Payload;

use crate::integration::init_tracing;
use crate::utils::{
    EventRecorder, MESSAGE_TIMEOUT_MS, RecordedEvent, connect_pair, new_peer,
};

#[tokio::test]
async fn test_peer_sends_message() {
    init_tracing();

    let alice = new_peer("alice-hi").await.expect("Failed to create offerer");
    let bob = new_peer("bob-hi").await.expect("Failed to create answerer");
    let bob_events = EventRecorder::attach(bob.events());

    connect_pair(&alice, &bob).await.expect("Handshake failed");

    alice.send("hi").await.expect("Failed to send message");

    let received = bob_events
        .wait_for(1, |e| matches!(e, RecordedEvent::Message(_)), MESSAGE_TIMEOUT_MS)
        .await;
    assert!(received, "Expected the message to reach the answerer");
    assert_eq!(bob_events.messages(), vec![Payload::Text("hi".to_owned())]);

    alice.close().await.expect("Failed to close offerer");
    bob.close().await.expect("Failed to close answerer");
}
