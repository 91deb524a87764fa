use pastelink_peer::{Phase, Role};

use crate::integration::init_tracing;
use crate::utils::{EventRecorder, RecordedEvent, TOKEN_TIMEOUT_MS, new_peer, with_timeout};

#[tokio::test]
async fn test_malformed_token() {
    init_tracing();

    let offerer = new_peer("malformed-offerer").await.expect("Failed to create offerer");
    let answerer = new_peer("malformed-answerer").await.expect("Failed to create answerer");
    let recorder = EventRecorder::attach(answerer.events());

    for garbage in ["not-a-valid-token", "", "AQ", "%%%"] {
        let err = answerer
            .apply_offer(garbage)
            .await
            .expect_err("garbage must not be accepted");
        assert!(err.is_decode(), "expected a decode error for {garbage:?}, got {err}");
        assert_eq!(answerer.phase(), Phase::Idle);
        assert_eq!(answerer.role(), Role::Undetermined);
    }
    assert!(recorder.events().is_empty());

    // The manager is still usable afterwards.
    let offer = with_timeout(TOKEN_TIMEOUT_MS, offerer.create_offer())
        .await
        .expect("Offer timed out")
        .expect("Failed to create offer");
    let answer = with_timeout(TOKEN_TIMEOUT_MS, answerer.apply_offer(&offer))
        .await
        .expect("Answer timed out")
        .expect("A valid offer should still be accepted");

    assert!(!answer.is_empty());
    assert_eq!(answerer.role(), Role::Answerer);
    assert_eq!(
        recorder.count(|e| matches!(e, RecordedEvent::HaveAnswer(_))),
        1
    );

    offerer.close().await.expect("Failed to close offerer");
    answerer.close().await.expect("Failed to close answerer");
}
