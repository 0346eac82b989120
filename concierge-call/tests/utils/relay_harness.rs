use concierge_call::{CallConfig, RetryPolicy};
use concierge_call::transport::TransportConfig;
use concierge_relay::{RelayService, serve};
use std::time::Duration;
use tokio::net::TcpListener;

/// Start an in-process relay on an ephemeral port. Returns its `ws://` URL.
pub async fn spawn_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test relay");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        if let Err(e) = serve(listener, RelayService::new()).await {
            tracing::error!("Test relay stopped: {:?}", e);
        }
    });

    format!("ws://{}/ws", addr)
}

/// Host candidates only and fast reconnects.
pub fn test_config(relay_url: &str) -> CallConfig {
    CallConfig {
        transport: TransportConfig::local_only(),
        retry: RetryPolicy::fixed(Duration::from_millis(100)),
        ..CallConfig::default().with_relay_url(relay_url)
    }
}
