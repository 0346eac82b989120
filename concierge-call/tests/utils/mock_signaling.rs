use async_trait::async_trait;
use concierge_call::signaling::SignalingOutput;
use concierge_core::SignalMessage;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures all outgoing frames.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to send captured frames.
    tx: mpsc::UnboundedSender<SignalMessage>,
    /// All captured frames (for verification).
    sent: Arc<Mutex<Vec<SignalMessage>>>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// Every captured frame of the given wire kind.
    pub async fn sent_of_kind(&self, kind: &str) -> Vec<SignalMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|msg| msg.kind() == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, msg: SignalMessage) {
        tracing::debug!("[MockSignaling] {} -> {:?}", msg.kind(), msg.target());
        self.sent.lock().await.push(msg.clone());
        let _ = self.tx.send(msg);
    }
}
