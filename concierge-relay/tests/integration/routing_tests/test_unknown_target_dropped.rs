use concierge_core::{ParticipantId, Role, SessionDescription, SignalMessage};

use crate::utils::{WsClient, init_tracing, spawn_relay};

#[tokio::test]
async fn test_unknown_target_dropped() {
    init_tracing();
    let url = spawn_relay().await;

    let mut caller = WsClient::register(&url, "user_hhh", Role::Customer)
        .await
        .expect("caller");

    // owner offline: no error reply, the caller just hears nothing
    caller
        .send(&SignalMessage::Call {
            user_id: ParticipantId::from("user_hhh"),
            target: ParticipantId::from("owner"),
            offer: SessionDescription::offer("v=0"),
        })
        .await
        .expect("send");
    caller.expect_silence().await.expect("no reply");

    // spoofed sender is dropped as well
    let mut owner = WsClient::register(&url, "owner", Role::Owner)
        .await
        .expect("owner");
    owner.recv().await.expect("snapshot");

    caller
        .send(&SignalMessage::EndCall {
            user_id: ParticipantId::from("someone_else"),
            target: ParticipantId::from("owner"),
        })
        .await
        .expect("send");
    owner.expect_silence().await.expect("spoof dropped");
}
