use concierge_core::{ParticipantId, Role, SignalMessage};

use crate::utils::{WsClient, init_tracing, spawn_relay};

#[tokio::test]
async fn test_owner_receives_snapshot() {
    init_tracing();
    let url = spawn_relay().await;

    let mut first = WsClient::register(&url, "user_aaa", Role::Customer)
        .await
        .expect("customer a");
    let mut second = WsClient::register(&url, "user_bbb", Role::Customer)
        .await
        .expect("customer b");

    // give the relay a moment to process both registrations
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let mut owner = WsClient::register(&url, "owner", Role::Owner)
        .await
        .expect("owner");

    let snapshot = owner.recv().await.expect("users snapshot");
    assert_eq!(
        snapshot,
        SignalMessage::Users {
            users: vec![ParticipantId::from("user_aaa"), ParticipantId::from("user_bbb")]
        }
    );

    // customers never see roster traffic
    first.expect_silence().await.expect("customer a quiet");
    second.expect_silence().await.expect("customer b quiet");
}
