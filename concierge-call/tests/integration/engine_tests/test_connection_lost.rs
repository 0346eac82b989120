use anyhow::{Result, bail};
use concierge_call::call::{CallCommand, CallEvent, Severity};
use concierge_call::media::MediaKind;
use concierge_call::CallStatus;
use concierge_core::{ParticipantId, SignalMessage};
use std::time::Duration;

use crate::utils::{EngineHarness, RemotePeer, init_tracing, is_kind};

/// Time for ICE to connect and the first RTP packets to land (ms).
const MEDIA_TIMEOUT_MS: u64 = 15000;

/// ICE reports `Disconnected` a few seconds after the remote goes silent (ms).
const CONNECTION_LOSS_TIMEOUT_MS: u64 = 20000;

/// Relay candidates both ways until each side receives the other's media.
async fn exchange_media(customer: &mut EngineHarness, owner: &mut RemotePeer) -> Result<MediaKind> {
    let customer_id = customer.handle.local_id().clone();
    let deadline = tokio::time::Instant::now() + Duration::from_millis(MEDIA_TIMEOUT_MS);
    let mut engine_track = None;

    loop {
        if let Some(kind) = engine_track {
            if owner.packets_received(MediaKind::Audio) > 0
                && owner.packets_received(MediaKind::Video) > 0
            {
                return Ok(kind);
            }
        }

        tokio::select! {
            frame = customer.signals.recv() => match frame {
                Some(SignalMessage::IceCandidate { candidate, .. }) => {
                    owner.add_ice_candidate(&candidate).await?;
                }
                Some(_) => {}
                None => bail!("Signaling mock dropped"),
            },

            candidate = owner.next_candidate() => {
                if let Some(candidate) = candidate {
                    customer
                        .deliver(SignalMessage::IceCandidate {
                            user_id: owner.id.clone(),
                            target: customer_id.clone(),
                            candidate,
                        })
                        .await?;
                }
            },

            event = customer.handle.next_event() => match event {
                Some(CallEvent::RemoteTrackAdded { kind }) => engine_track = Some(kind),
                Some(_) => {}
                None => bail!("Engine stopped"),
            },

            // packet counters move without any event
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}

            _ = tokio::time::sleep_until(deadline) => bail!("Media did not flow both ways"),
        }
    }
}

#[tokio::test]
async fn test_media_flows_then_connection_lost() {
    init_tracing();
    let mut customer = EngineHarness::start("user_lost00001");
    let mut owner = RemotePeer::new("owner", "user_lost00001")
        .await
        .expect("remote peer");

    customer
        .command(CallCommand::StartCall {
            target: owner.id.clone(),
        })
        .await
        .expect("start call");
    let SignalMessage::Call { offer, .. } = customer
        .wait_for_signal(is_kind("call"))
        .await
        .expect("call frame")
    else {
        panic!("expected call");
    };

    let answer = owner.accept_offer(&offer).await.expect("answer");
    customer
        .deliver(SignalMessage::CallAccepted {
            user_id: owner.id.clone(),
            target: ParticipantId::from("user_lost00001"),
            answer,
        })
        .await
        .expect("deliver answer");

    let kind = exchange_media(&mut customer, &mut owner)
        .await
        .expect("media in both directions");
    assert!(matches!(kind, MediaKind::Audio | MediaKind::Video));
    assert_eq!(customer.media.live_tracks(), 2);

    // the owner vanishes without any signaling
    owner.close().await.expect("close");

    customer
        .wait_for_event_within(
            |e| {
                matches!(
                    e,
                    CallEvent::StatusChanged {
                        status: CallStatus::Idle,
                        ..
                    }
                )
            },
            CONNECTION_LOSS_TIMEOUT_MS,
        )
        .await
        .expect("idle after connection loss");

    let lost = customer
        .wait_for_event(|e| matches!(e, CallEvent::Notification(n) if n.severity == Severity::Error))
        .await
        .expect("error notification");
    let CallEvent::Notification(notification) = lost else {
        panic!("expected notification");
    };
    assert_eq!(notification.message, "Connection lost");

    let SignalMessage::EndCall { target, .. } = customer
        .wait_for_signal(is_kind("endCall"))
        .await
        .expect("endCall")
    else {
        panic!("expected endCall");
    };
    assert_eq!(target, ParticipantId::from("owner"));
    assert_eq!(customer.media.live_tracks(), 0);
}
