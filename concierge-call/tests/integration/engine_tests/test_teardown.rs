use concierge_call::call::{CallCommand, CallEvent, RosterUpdate};
use concierge_call::CallStatus;
use concierge_call::signaling::ChannelEvent;
use concierge_core::{ParticipantId, SignalMessage};

use crate::utils::{EngineHarness, init_tracing, is_kind};

async fn calling(local_id: &str) -> EngineHarness {
    let mut harness = EngineHarness::start(local_id);
    harness
        .command(CallCommand::StartCall {
            target: ParticipantId::from("owner"),
        })
        .await
        .expect("start");
    harness
        .wait_for_signal(is_kind("call"))
        .await
        .expect("call frame");
    harness
}

#[tokio::test]
async fn test_end_is_idempotent() {
    init_tracing();
    let mut customer = calling("user_end000001").await;

    customer.command(CallCommand::End).await.expect("end");
    customer.command(CallCommand::End).await.expect("end again");

    customer
        .wait_for_signal(is_kind("endCall"))
        .await
        .expect("first endCall");
    customer
        .expect_no_signal(is_kind("endCall"))
        .await
        .expect("only one endCall");
    assert_eq!(customer.media.live_tracks(), 0);
}

#[tokio::test]
async fn test_peer_leaving_roster_tears_down() {
    init_tracing();
    let mut customer = calling("user_left00001").await;

    customer
        .deliver(SignalMessage::UserDisconnected {
            user_id: ParticipantId::from("owner"),
        })
        .await
        .expect("deliver");

    customer
        .wait_for_event(|e| matches!(e, CallEvent::Roster(RosterUpdate::Left(_))))
        .await
        .expect("roster event");
    customer
        .wait_for_status(CallStatus::Idle)
        .await
        .expect("idle");
    customer
        .expect_no_signal(is_kind("endCall"))
        .await
        .expect("peer is gone, nothing to notify");
}

#[tokio::test]
async fn test_unrelated_departure_keeps_call() {
    init_tracing();
    let mut customer = calling("user_stay00001").await;

    customer
        .deliver(SignalMessage::UserDisconnected {
            user_id: ParticipantId::from("user_someone1"),
        })
        .await
        .expect("deliver");
    customer
        .deliver(SignalMessage::EndCall {
            user_id: ParticipantId::from("user_someone1"),
            target: ParticipantId::from("user_stay00001"),
        })
        .await
        .expect("deliver");

    // still calling: an explicit end is what finally notifies the owner
    customer.command(CallCommand::End).await.expect("end");
    let SignalMessage::EndCall { target, .. } = customer
        .wait_for_signal(is_kind("endCall"))
        .await
        .expect("endCall")
    else {
        panic!("expected endCall");
    };
    assert_eq!(target, ParticipantId::from("owner"));
}

#[tokio::test]
async fn test_signaling_drop_keeps_call() {
    init_tracing();
    let mut customer = calling("user_drop00001").await;

    customer
        .channel_tx
        .send(ChannelEvent::Disconnected)
        .await
        .expect("deliver");
    customer
        .wait_for_event(|e| matches!(e, CallEvent::SignalingDisconnected))
        .await
        .expect("disconnected event");

    customer
        .expect_no_signal(is_kind("endCall"))
        .await
        .expect("call survives the drop");
    assert_eq!(customer.media.live_tracks(), 2);
}

#[tokio::test]
async fn test_dispose_ends_active_call() {
    init_tracing();
    let EngineHarness {
        handle,
        mut signals,
        media,
        ..
    } = calling("user_bye000001").await;

    handle.dispose().await;

    let mut saw_end = false;
    while let Ok(msg) = signals.try_recv() {
        if let SignalMessage::EndCall { target, .. } = msg {
            assert_eq!(target, ParticipantId::from("owner"));
            saw_end = true;
        }
    }
    assert!(saw_end, "dispose should hang up");
    assert_eq!(media.live_tracks(), 0);
}
