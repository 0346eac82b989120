use anyhow::{Context, Result, bail};
use concierge_core::{ParticipantId, Role, SignalMessage};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected frame (ms).
pub const FRAME_TIMEOUT_MS: u64 = 2000;

/// Window in which no frame must arrive (ms).
pub const QUIET_WINDOW_MS: u64 = 300;

/// Raw relay client speaking the JSON protocol.
pub struct WsClient {
    pub user_id: ParticipantId,
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str, user_id: &str) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .context("Failed to connect to relay")?;
        Ok(Self {
            user_id: ParticipantId::from(user_id),
            socket,
        })
    }

    /// Connect and register in one go.
    pub async fn register(url: &str, user_id: &str, role: Role) -> Result<Self> {
        let mut client = Self::connect(url, user_id).await?;
        client
            .send(&SignalMessage::Register {
                user_id: client.user_id.clone(),
                role,
            })
            .await?;
        Ok(client)
    }

    pub async fn send(&mut self, msg: &SignalMessage) -> Result<()> {
        self.send_raw(&msg.to_json()?).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.socket
            .send(Message::Text(text.to_owned().into()))
            .await
            .context("Failed to send frame")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let timeout = Duration::from_millis(FRAME_TIMEOUT_MS);
        loop {
            let frame = tokio::time::timeout(timeout, self.socket.next())
                .await
                .context("Timeout waiting for frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return Ok(SignalMessage::from_json(text.as_str())?);
                }
                Some(Ok(Message::Close(_))) | None => bail!("Socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("Socket error: {}", e),
            }
        }
    }

    /// Asserts nothing is delivered within the quiet window.
    pub async fn expect_silence(&mut self) -> Result<()> {
        let window = Duration::from_millis(QUIET_WINDOW_MS);
        match tokio::time::timeout(window, self.socket.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("Unexpected frame: {}", text.as_str()),
            Ok(other) => bail!("Unexpected socket activity: {:?}", other),
        }
    }

    /// Waits for the relay to close this socket.
    pub async fn expect_closed(&mut self) -> Result<()> {
        let timeout = Duration::from_millis(FRAME_TIMEOUT_MS);
        loop {
            match tokio::time::timeout(timeout, self.socket.next())
                .await
                .context("Timeout waiting for close")?
            {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return Ok(()),
                Some(Ok(_)) => continue,
            }
        }
    }
}
