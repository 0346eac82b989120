use concierge_call::media::SyntheticMediaSource;
use concierge_call::{CallEvent, CallStatus, CustomerController, OwnerController, Severity};
use std::sync::Arc;

use super::{customer_until, owner_until, status_is};
use crate::utils::{init_tracing, spawn_relay, test_config};

#[tokio::test]
async fn test_second_customer_hears_busy() {
    init_tracing();
    let url = spawn_relay().await;
    let config = test_config(&url);

    let mut owner = OwnerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    owner_until(&mut owner, |o, _| o.is_connected())
        .await
        .expect("owner registered");

    let mut first = CustomerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    let mut second = CustomerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    customer_until(&mut first, |c, _| c.is_connected())
        .await
        .expect("first registered");
    customer_until(&mut second, |c, _| c.is_connected())
        .await
        .expect("second registered");

    first.call().await.expect("first call");
    owner_until(&mut owner, |o, _| o.incoming_caller().is_some())
        .await
        .expect("ringing");

    second.call().await.expect("second call");
    customer_until(&mut second, |_, e| {
        matches!(e, CallEvent::Notification(n) if n.severity == Severity::Warning && n.message.contains("busy"))
    })
    .await
    .expect("busy notification");
    assert_eq!(second.status(), CallStatus::Idle);

    // the first call is untouched
    assert_eq!(owner.incoming_caller(), Some(first.id()));
    owner.reject().await.expect("reject");
    customer_until(&mut first, |_, e| status_is(CallStatus::Idle)(e))
        .await
        .expect("first back to idle");

    first.dispose().await;
    second.dispose().await;
    owner.dispose().await;
}
