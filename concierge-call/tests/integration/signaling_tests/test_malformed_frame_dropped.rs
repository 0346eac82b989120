use concierge_call::signaling::{ChannelEvent, Registration, RetryPolicy, SignalingChannel};
use concierge_core::{ParticipantId, Role, SignalMessage};
use futures::SinkExt;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use super::accept_register;
use crate::utils::{EVENT_TIMEOUT_MS, QUIET_WINDOW_MS, init_tracing};

#[tokio::test]
async fn test_malformed_frame_dropped() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let url = format!("ws://{}", listener.local_addr().expect("addr"));

    let (_handle, mut events) = SignalingChannel::spawn(
        url,
        Registration::new(ParticipantId::from("owner"), Role::Owner),
        RetryPolicy::fixed(Duration::from_millis(50)),
    );

    let (_, mut socket) = accept_register(&listener).await;
    assert_eq!(events.recv().await, Some(ChannelEvent::Connected));

    let users = SignalMessage::Users {
        users: vec![ParticipantId::from("user_frame0001")],
    };
    socket
        .send(Message::Text("not json".into()))
        .await
        .expect("send garbage");
    socket
        .send(Message::Text(users.to_json().expect("encode").into()))
        .await
        .expect("send users");

    let timeout = Duration::from_millis(EVENT_TIMEOUT_MS);
    let next = tokio::time::timeout(timeout, events.recv())
        .await
        .expect("no event after garbage");
    assert_eq!(next, Some(ChannelEvent::Message(users)));

    // the socket survives: no drop, no error, no reconnect
    let quiet = Duration::from_millis(QUIET_WINDOW_MS);
    let after = tokio::time::timeout(quiet, events.recv()).await;
    assert!(after.is_err(), "unexpected event: {:?}", after);
}
