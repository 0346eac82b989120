use concierge_core::{ParticipantId, Role, SignalMessage};

use crate::utils::{WsClient, init_tracing, spawn_relay};

#[tokio::test]
async fn test_remove_user() {
    init_tracing();
    let url = spawn_relay().await;

    let mut owner = WsClient::register(&url, "owner", Role::Owner)
        .await
        .expect("owner");
    owner.recv().await.expect("snapshot");

    let mut target = WsClient::register(&url, "user_iii", Role::Customer)
        .await
        .expect("target");
    let mut other = WsClient::register(&url, "user_jjj", Role::Customer)
        .await
        .expect("other");
    owner.recv().await.expect("join target");
    owner.recv().await.expect("join other");

    // customers cannot remove anyone
    other
        .send(&SignalMessage::RemoveUser {
            user_id: ParticipantId::from("user_iii"),
        })
        .await
        .expect("send");
    owner.expect_silence().await.expect("ignored");

    owner
        .send(&SignalMessage::RemoveUser {
            user_id: ParticipantId::from("user_iii"),
        })
        .await
        .expect("send");

    target.expect_closed().await.expect("target closed");
    assert_eq!(
        owner.recv().await.expect("leave"),
        SignalMessage::UserDisconnected {
            user_id: ParticipantId::from("user_iii")
        }
    );
    owner.expect_silence().await.expect("announced once");
}
