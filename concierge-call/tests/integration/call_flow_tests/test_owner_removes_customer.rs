use concierge_call::media::SyntheticMediaSource;
use concierge_call::{
    CallEvent, CustomerController, OwnerController, RosterEntry, RosterUpdate,
};
use std::sync::Arc;

use super::{customer_until, owner_until};
use crate::utils::{init_tracing, spawn_relay, test_config};

#[tokio::test]
async fn test_owner_removes_customer() {
    init_tracing();
    let url = spawn_relay().await;
    let config = test_config(&url);

    let mut owner = OwnerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    owner_until(&mut owner, |o, _| o.is_connected())
        .await
        .expect("owner registered");

    let mut customer = CustomerController::connect(&config, Arc::new(SyntheticMediaSource::new()));
    customer_until(&mut customer, |c, _| c.is_connected())
        .await
        .expect("customer registered");

    let customer_id = customer.id().clone();
    owner_until(&mut owner, |o, _| o.roster().contains(&customer_id))
        .await
        .expect("customer listed");

    assert!(owner.remove_user(&customer_id).await.expect("remove"));
    assert_eq!(
        owner.roster().get(&customer_id),
        Some(RosterEntry::PendingRemoval)
    );

    let gone = customer_id.clone();
    owner_until(&mut owner, move |_, e| {
        matches!(e, CallEvent::Roster(RosterUpdate::Left(id)) if *id == gone)
    })
    .await
    .expect("relay confirmed removal");
    assert!(!owner.roster().contains(&customer_id));

    customer_until(&mut customer, |_, e| matches!(e, CallEvent::SignalingDisconnected))
        .await
        .expect("customer dropped");

    customer.dispose().await;
    owner.dispose().await;
}
