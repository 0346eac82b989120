use concierge_core::{IceCandidate, ParticipantId, RejectReason, Role, SessionDescription, SignalMessage};

use crate::utils::{WsClient, init_tracing, spawn_relay};

#[tokio::test]
async fn test_frames_routed_by_target() {
    init_tracing();
    let url = spawn_relay().await;

    let mut owner = WsClient::register(&url, "owner", Role::Owner)
        .await
        .expect("owner");
    owner.recv().await.expect("snapshot");

    let mut caller = WsClient::register(&url, "user_fff", Role::Customer)
        .await
        .expect("caller");
    let mut bystander = WsClient::register(&url, "user_ggg", Role::Customer)
        .await
        .expect("bystander");
    owner.recv().await.expect("join caller");
    owner.recv().await.expect("join bystander");

    let call = SignalMessage::Call {
        user_id: ParticipantId::from("user_fff"),
        target: ParticipantId::from("owner"),
        offer: SessionDescription::offer("v=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n"),
    };
    caller.send(&call).await.expect("send call");
    assert_eq!(owner.recv().await.expect("call"), call);

    let candidate = SignalMessage::IceCandidate {
        user_id: ParticipantId::from("owner"),
        target: ParticipantId::from("user_fff"),
        candidate: IceCandidate {
            candidate: "candidate:1 1 udp 2130706431 127.0.0.1 50000 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_m_line_index: Some(0),
            username_fragment: None,
        },
    };
    owner.send(&candidate).await.expect("send candidate");
    assert_eq!(caller.recv().await.expect("candidate"), candidate);

    let rejected = SignalMessage::CallRejected {
        user_id: ParticipantId::from("owner"),
        target: ParticipantId::from("user_fff"),
        reason: RejectReason::Busy,
    };
    owner.send(&rejected).await.expect("send reject");
    assert_eq!(caller.recv().await.expect("reject"), rejected);

    bystander.expect_silence().await.expect("bystander quiet");
}
