use crate::signaling::{ChannelEvent, RetryPolicy, SignalingOutput};
use anyhow::Result;
use async_trait::async_trait;
use concierge_core::{ParticipantId, Role, SignalMessage};
use futures::{Sink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type RelaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Who this endpoint is. Sent as `register` after every (re)connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user_id: ParticipantId,
    pub role: Role,
}

impl Registration {
    pub fn new(user_id: ParticipantId, role: Role) -> Self {
        Self { user_id, role }
    }

    fn to_message(&self) -> SignalMessage {
        SignalMessage::Register {
            user_id: self.user_id.clone(),
            role: self.role,
        }
    }
}

/// Sending half of the signaling channel. Cheap to clone.
///
/// The background connection task ends once every handle is dropped.
#[derive(Clone)]
pub struct SignalingHandle {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

#[async_trait]
impl SignalingOutput for SignalingHandle {
    async fn send(&self, msg: SignalMessage) {
        if let Err(e) = self.tx.send(msg) {
            warn!("Signaling channel is gone, dropping '{}'", e.0.kind());
        }
    }
}

enum SessionEnd {
    /// Every handle dropped or nobody listens to events anymore.
    Shutdown,
    /// Socket closed or errored after it was established.
    Dropped,
    /// Socket opened but registration could not be written.
    Failed(String),
}

/// Single persistent connection to the relay, reconnecting per [`RetryPolicy`].
pub struct SignalingChannel {
    url: String,
    registration: Registration,
    policy: RetryPolicy,
    outgoing_rx: mpsc::UnboundedReceiver<SignalMessage>,
    events_tx: mpsc::Sender<ChannelEvent>,
}

impl SignalingChannel {
    pub fn spawn(
        url: impl Into<String>,
        registration: Registration,
        policy: RetryPolicy,
    ) -> (SignalingHandle, mpsc::Receiver<ChannelEvent>) {
        let (tx, outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(256);

        let channel = Self {
            url: url.into(),
            registration,
            policy,
            outgoing_rx,
            events_tx,
        };
        tokio::spawn(channel.run());

        (SignalingHandle { tx }, events_rx)
    }

    async fn run(mut self) {
        let mut attempt: u32 = 0;

        loop {
            match connect_async(self.url.as_str()).await {
                Ok((socket, _)) => {
                    attempt = 0;
                    info!(
                        "Signaling connected to {} as {} ({:?})",
                        self.url, self.registration.user_id, self.registration.role
                    );

                    match self.drive(socket).await {
                        SessionEnd::Shutdown => break,
                        SessionEnd::Dropped => {
                            if !self.emit(ChannelEvent::Disconnected).await {
                                break;
                            }
                        }
                        SessionEnd::Failed(reason) => {
                            if !self.emit(ChannelEvent::Error(reason)).await {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Signaling connect to {} failed: {}", self.url, e);
                    if !self.emit(ChannelEvent::Error(e.to_string())).await {
                        break;
                    }
                }
            }

            let delay = self.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            info!(
                "Reconnecting to {} in {:?} (attempt {})",
                self.url, delay, attempt
            );

            if !self.wait_for_retry(delay).await {
                break;
            }
        }

        info!(
            "Signaling channel for {} stopped",
            self.registration.user_id
        );
    }

    async fn drive(&mut self, socket: RelaySocket) -> SessionEnd {
        let (mut sink, mut stream) = socket.split();

        if let Err(e) = send_frame(&mut sink, &self.registration.to_message()).await {
            warn!("Failed to register {}: {:?}", self.registration.user_id, e);
            return SessionEnd::Failed(e.to_string());
        }

        if !self.emit(ChannelEvent::Connected).await {
            return SessionEnd::Shutdown;
        }

        loop {
            tokio::select! {
                outgoing = self.outgoing_rx.recv() => match outgoing {
                    Some(msg) => {
                        debug!("WS OUT: {} -> {:?}", msg.kind(), msg.target());
                        if let Err(e) = send_frame(&mut sink, &msg).await {
                            warn!("Failed to send '{}': {:?}", msg.kind(), e);
                            return SessionEnd::Dropped;
                        }
                    }
                    None => {
                        let _ = sink.close().await;
                        return SessionEnd::Shutdown;
                    }
                },

                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match SignalMessage::from_json(text.as_str()) {
                            Ok(msg) => {
                                debug!("WS IN: {} from {:?}", msg.kind(), msg.sender());
                                if !self.emit(ChannelEvent::Message(msg)).await {
                                    return SessionEnd::Shutdown;
                                }
                            }
                            Err(e) => warn!("Dropping malformed signaling frame: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("Relay closed the connection: {:?}", frame);
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Signaling socket error: {}", e);
                        if !self.emit(ChannelEvent::Error(e.to_string())).await {
                            return SessionEnd::Shutdown;
                        }
                        return SessionEnd::Dropped;
                    }
                    None => {
                        info!("Signaling socket ended");
                        return SessionEnd::Dropped;
                    }
                },
            }
        }
    }

    /// Sleeps out the retry delay. Frames sent meanwhile are dropped, not replayed.
    async fn wait_for_retry(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                msg = self.outgoing_rx.recv() => match msg {
                    Some(msg) => warn!(
                        "Not connected to relay, dropping '{}' for {:?}",
                        msg.kind(),
                        msg.target()
                    ),
                    None => return false,
                },
                _ = self.events_tx.closed() => return false,
            }
        }
    }

    async fn emit(&self, event: ChannelEvent) -> bool {
        self.events_tx.send(event).await.is_ok()
    }
}

async fn send_frame<S>(sink: &mut S, msg: &SignalMessage) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let json = msg.to_json()?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}
